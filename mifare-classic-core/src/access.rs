//! Codec for the access-condition bits stored in a sector trailer.
//!
//! Trailer bytes 6..9 hold a 24-bit field where every block of the sector
//! owns three control bits (C1, C2, C3) scattered across the three bytes,
//! with each nibble stored alongside its bitwise complement so a reader can
//! detect a corrupted trailer. The packing is mandated by the MIFARE Classic
//! silicon and has to be reproduced bit-exactly.

use crate::block::BlockOffset;
use crate::error::Error;

/// A 3-bit access condition for one block, decoded as `C1 C2 C3`.
///
/// The same value means different things for a data block and for the
/// trailer; [`data_rule`](AccessCondition::data_rule) and
/// [`trailer_rule`](AccessCondition::trailer_rule) describe both readings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessCondition(u8);

/// Human-readable trailer-block rules, indexed by the 3-bit condition value.
///
/// Display only; the card itself enforces the conditions.
const TRAILER_RULES: [&str; 8] = [
    "Key A: write A | Access bits: read A | Key B: read/write A",
    "Key A: write A | Access bits: read/write A | Key B: read/write A",
    "Key A: never | Access bits: read A | Key B: read A",
    "Key A: write B | Access bits: read A/B, write B | Key B: write B",
    "Key A: write B | Access bits: read A/B | Key B: write B",
    "Key A: never | Access bits: read A/B, write B | Key B: never",
    "Key A: never | Access bits: read A/B | Key B: never",
    "Key A: never | Access bits: read A/B | Key B: never",
];

/// Human-readable data-block rules, indexed by the 3-bit condition value.
const DATA_RULES: [&str; 8] = [
    "read A/B, write A/B, increment A/B, decrement/transfer/restore A/B",
    "read A/B, decrement/transfer/restore A/B",
    "read A/B",
    "read B, write B",
    "read A/B, write B",
    "read B",
    "read A/B, write B, increment B, decrement/transfer/restore A/B",
    "no access",
];

impl AccessCondition {
    pub fn value(self) -> u8 {
        self.0
    }

    /// Describes this condition as applied to the sector trailer.
    pub fn trailer_rule(self) -> &'static str {
        TRAILER_RULES[self.0 as usize]
    }

    /// Describes this condition as applied to a data block.
    pub fn data_rule(self) -> &'static str {
        DATA_RULES[self.0 as usize]
    }
}

impl TryFrom<u8> for AccessCondition {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=7 => Ok(AccessCondition(value)),
            _ => Err(Error::InvalidAccessCondition(value)),
        }
    }
}

impl From<AccessCondition> for u8 {
    fn from(value: AccessCondition) -> Self {
        value.0
    }
}

/// The 24-bit access field from trailer bytes 6, 7 and 8, read big-endian.
///
/// Bit layout per block `i` (0..=3): C1 at bit `12 + i`, C2 at bit `i`, C3 at
/// bit `4 + i`. Bits 16..24 and 8..12 carry the complement nibbles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessBits(u32);

/// Per-block masks that clear the block's three control bits together with
/// all complement nibbles, preserving the other blocks' bits.
const CLEAR_MASKS: [u32; 4] = [0x00E0EE, 0x00D0DD, 0x00B0BB, 0x007077];

impl AccessBits {
    /// Decodes the field from trailer bytes 6, 7, 8.
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        AccessBits(
            (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2]),
        )
    }

    /// Encodes the field back into trailer bytes 6, 7, 8.
    pub fn to_bytes(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Decodes the access condition of one block.
    pub fn of(self, offset: BlockOffset) -> AccessCondition {
        let i = offset as u32;
        let c1 = (self.0 >> (12 + i)) & 1;
        let c2 = (self.0 >> i) & 1;
        let c3 = (self.0 >> (4 + i)) & 1;
        AccessCondition(((c1 << 2) | (c2 << 1) | c3) as u8)
    }

    /// Replaces the access condition of one block, leaving the other blocks'
    /// conditions untouched, and recomputes the complement nibbles.
    pub fn set(&mut self, offset: BlockOffset, condition: AccessCondition) {
        let i = offset as u32;
        let value = u32::from(condition.0);

        let mut c = self.0 & CLEAR_MASKS[offset as usize];
        c |= ((value >> 2) & 1) << (12 + i);
        c |= ((value >> 1) & 1) << i;
        c |= (value & 1) << (4 + i);

        // The masks cleared every complement nibble, so recompute all three
        // from the real nibbles.
        c |= ((!c & 0xF) << 20) | ((!c & 0xF0) << 4) | ((!c & 0xF000) << 4);
        self.0 = c;
    }

    /// Checks the complement redundancy: each stored nibble must match the
    /// bitwise inverse of its real counterpart.
    pub fn is_consistent(self) -> bool {
        let c = self.0;
        (c >> 20) & 0xF == !c & 0xF
            && (c >> 16) & 0xF == (!c >> 12) & 0xF
            && (c >> 8) & 0xF == (!c >> 4) & 0xF
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Trailer bytes of a card in transport configuration.
    const TRANSPORT: [u8; 3] = [0xFF, 0x07, 0x80];
    // Access bits of a MAD sector: Key A read, Key B read/write.
    const MAD: [u8; 3] = [0x78, 0x77, 0x88];

    fn offsets() -> [BlockOffset; 4] {
        BlockOffset::ALL
    }

    #[test]
    fn decode_transport_configuration() {
        let bits = AccessBits::from_bytes(TRANSPORT);
        assert_eq!(0, bits.of(BlockOffset::B0).value());
        assert_eq!(0, bits.of(BlockOffset::B1).value());
        assert_eq!(0, bits.of(BlockOffset::B2).value());
        assert_eq!(1, bits.of(BlockOffset::B3).value());
        assert!(bits.is_consistent());
    }

    #[test]
    fn decode_mad_access_bits() {
        let bits = AccessBits::from_bytes(MAD);
        assert_eq!(4, bits.of(BlockOffset::B0).value());
        assert_eq!(4, bits.of(BlockOffset::B1).value());
        assert_eq!(4, bits.of(BlockOffset::B2).value());
        assert_eq!(3, bits.of(BlockOffset::B3).value());
        assert!(bits.is_consistent());
    }

    #[test]
    fn encode_transport_configuration_from_scratch() {
        let mut bits = AccessBits::from_bytes([0x00, 0x00, 0x00]);
        for offset in [BlockOffset::B0, BlockOffset::B1, BlockOffset::B2] {
            bits.set(offset, AccessCondition::try_from(0).unwrap());
        }
        bits.set(BlockOffset::B3, AccessCondition::try_from(1).unwrap());
        assert_eq!(TRANSPORT, bits.to_bytes());
    }

    #[test]
    fn set_round_trips_and_preserves_other_blocks() {
        for offset in offsets() {
            for value in 0u8..=7u8 {
                let mut bits = AccessBits::from_bytes(TRANSPORT);
                let before: [u8; 4] =
                    offsets().map(|o| bits.of(o).value());

                bits.set(offset, AccessCondition::try_from(value).unwrap());

                assert_eq!(value, bits.of(offset).value());
                for other in offsets() {
                    if other != offset {
                        assert_eq!(before[other as usize], bits.of(other).value());
                    }
                }
            }
        }
    }

    #[test]
    fn set_always_restores_complement_redundancy() {
        // Even a garbage starting field must come out consistent.
        for start in [[0x00, 0x00, 0x00], [0xFF, 0xFF, 0xFF], [0x12, 0x34, 0x56]] {
            for offset in offsets() {
                for value in 0u8..=7u8 {
                    let mut bits = AccessBits::from_bytes(start);
                    bits.set(offset, AccessCondition::try_from(value).unwrap());
                    assert!(bits.is_consistent());
                }
            }
        }
    }

    #[test]
    fn corrupt_field_is_inconsistent() {
        assert!(!AccessBits::from_bytes([0xFF, 0x07, 0x81]).is_consistent());
        assert!(!AccessBits::from_bytes([0x00, 0x00, 0x00]).is_consistent());
    }

    #[test]
    fn byte_round_trip() {
        for bytes in [TRANSPORT, MAD, [0x12, 0x34, 0x56]] {
            assert_eq!(bytes, AccessBits::from_bytes(bytes).to_bytes());
        }
    }

    #[test]
    fn condition_value_range() {
        for value in 0u8..=7u8 {
            assert_eq!(value, AccessCondition::try_from(value).unwrap().value());
        }
        for value in 8u8..=u8::MAX {
            assert_eq!(
                AccessCondition::try_from(value),
                Err(Error::InvalidAccessCondition(value))
            );
        }
    }

    #[test]
    fn rule_tables_cover_every_condition() {
        for value in 0u8..=7u8 {
            let condition = AccessCondition::try_from(value).unwrap();
            assert!(!condition.trailer_rule().is_empty());
            assert!(!condition.data_rule().is_empty());
        }
        // Transport configuration leaves everything open to Key A.
        let transport = AccessCondition::try_from(1).unwrap();
        assert!(transport.trailer_rule().contains("read/write A"));
    }
}
