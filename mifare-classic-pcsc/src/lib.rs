//! PC/SC transport for `mifare-classic-core`.
//!
//! Establishes a PC/SC context, enumerates readers and connects to a card,
//! exposing it as a [`CardTransport`](mifare_classic_core::CardTransport).

mod card;
mod context;
mod error;
mod reader;

pub use card::PcscCard;
pub use context::PcscContext;
pub use error::Error;
pub use reader::PcscReader;
