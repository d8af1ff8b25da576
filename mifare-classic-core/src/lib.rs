#![no_std]

//! MIFARE Classic 1K/4K primitives on top of a PC/SC-style reader transport:
//! block and sector addressing, the reader command set, sector state with a
//! lazily populated block cache, the trailer access-condition codec and the
//! MAD CRC-8.
//!
//! The crate performs no I/O of its own; readers are plugged in through the
//! [`CardTransport`] trait.

#[cfg(feature = "std")]
extern crate std;

pub mod access;
pub mod block;
pub mod crc;
pub mod error;
pub mod key;
pub mod sector;
pub mod session;
pub mod transport;

pub use access::{AccessBits, AccessCondition};
pub use block::{Block, BlockOffset, SectorIndex};
pub use error::Error;
pub use key::{KeyId, KeyStorage, KeyType, MifareKey, PUBLIC_KEYS};
pub use sector::Sector;
pub use session::Session;
pub use transport::{CardTransport, StatusWord};
