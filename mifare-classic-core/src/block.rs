use core::{fmt, mem::transmute};

use crate::error::Error;

/// Represents the offset of a block within a MIFARE Classic sector.
///
/// `B0`..`B2` are data blocks, `B3` is the sector trailer holding Key A, the
/// access conditions, the general purpose byte and Key B.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockOffset {
    B0 = 0,
    B1,
    B2,
    B3,
}

impl BlockOffset {
    /// All offsets of a sector, in card order.
    pub const ALL: [BlockOffset; 4] = [
        BlockOffset::B0,
        BlockOffset::B1,
        BlockOffset::B2,
        BlockOffset::B3,
    ];

    /// The sector trailer block.
    pub const TRAILER: BlockOffset = BlockOffset::B3;

    /// Converts a u8 block offset into a `BlockOffset` enum variant.
    ///
    /// # Panics
    /// This code will panic if `offset` is greater than 3.
    fn from_u8(offset: u8) -> Self {
        assert!(offset <= Self::B3 as u8);
        unsafe { transmute(offset) }
    }
}

impl TryFrom<u8> for BlockOffset {
    type Error = Error;

    fn try_from(offset: u8) -> Result<Self, Self::Error> {
        match offset {
            0..=3 => Ok(BlockOffset::from_u8(offset)),
            _ => Err(Error::InvalidBlockOffset(offset)),
        }
    }
}

impl fmt::Display for BlockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Represents a valid zero-based MIFARE Classic sector number from 0 to 39.
///
/// Sectors are addressed as 16-byte-block-aligned groups of 4 blocks; the
/// absolute address of a block is `sector * 4 + offset`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SectorIndex(u8);

impl SectorIndex {
    /// The highest sector number on a MIFARE Classic 4K card.
    pub const MAX: u8 = 39;

    /// Gets the absolute address of the specified block offset within this
    /// sector.
    pub fn block(self, offset: BlockOffset) -> Block {
        Block((self.0 * 4) + offset as u8)
    }
}

impl TryFrom<u8> for SectorIndex {
    type Error = Error;

    fn try_from(sector: u8) -> Result<Self, Self::Error> {
        match sector {
            0..=Self::MAX => Ok(SectorIndex(sector)),
            _ => Err(Error::InvalidSector(sector)),
        }
    }
}

impl From<SectorIndex> for u8 {
    fn from(value: SectorIndex) -> Self {
        value.0
    }
}

impl fmt::Display for SectorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sector {}", self.0)
    }
}

/// Represents an absolute MIFARE Classic block address.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Block(u8);

impl Block {
    /// The block address as the big-endian high/low byte pair used in the
    /// Read Binary, Update Binary and General Authenticate commands.
    pub fn address(self) -> [u8; 2] {
        u16::from(self.0).to_be_bytes()
    }
}

impl From<u8> for Block {
    fn from(value: u8) -> Self {
        Block(value)
    }
}

impl From<Block> for u8 {
    fn from(value: Block) -> Self {
        value.0
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block {}", self.0)
    }
}
