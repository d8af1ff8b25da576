//! Key material and reader-side key addressing.

/// A 6-byte MIFARE Classic sector key.
pub type MifareKey = [u8; 6];

/// All-zero key, found on some blank or wiped cards.
pub const EMPTY_KEY: MifareKey = [0x00; 6];

/// Factory default Key A/B for MIFARE Classic sectors.
pub const DEFAULT_KEY: MifareKey = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

/// Default Key A for MIFARE Application Directory (MAD) sectors.
pub const MAD_KEY_A: MifareKey = [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];

/// Default Key B for MIFARE Application Directory (MAD) sectors.
pub const MAD_KEY_B: MifareKey = [0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5];

/// Key A mandated by the NFC Forum for NDEF data sectors.
pub const NDEF_KEY_A: MifareKey = [0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7];

/// Well-known keys tried in order when probing a card without credentials.
///
/// The order matters: [`Sector::authenticate_public`] reports the index of
/// the first match and stops probing.
///
/// [`Sector::authenticate_public`]: crate::sector::Sector::authenticate_public
pub const PUBLIC_KEYS: [MifareKey; 4] = [EMPTY_KEY, MAD_KEY_A, DEFAULT_KEY, NDEF_KEY_A];

/// Represents which MIFARE Classic key to use for authentication.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyType {
    KeyA,
    KeyB,
}

impl KeyType {
    /// The key type byte used in the General Authenticate payload.
    pub fn code(self) -> u8 {
        match self {
            KeyType::KeyA => 0x60,
            KeyType::KeyB => 0x61,
        }
    }

    /// Index of this key type's slot in a sector's key-id pair.
    pub(crate) fn slot(self) -> usize {
        match self {
            KeyType::KeyA => 0,
            KeyType::KeyB => 1,
        }
    }
}

/// How the reader stores a key under a given id.
///
/// Some reader models expose two fixed internal key slots behind the magic
/// ids `0x60` and `0x61`; those take a proprietary Load Key variant and are
/// addressed as slot `0x01` during authentication. Every other id is a
/// regular volatile key location.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyStorage {
    Preset,
    Standard,
}

/// Identifies a reader-resident key location.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyId(pub u8);

impl KeyId {
    /// Classifies the id into the reader's key storage mode.
    pub fn storage(self) -> KeyStorage {
        match self.0 {
            0x60 | 0x61 => KeyStorage::Preset,
            _ => KeyStorage::Standard,
        }
    }

    /// The key id byte sent in the General Authenticate payload.
    pub(crate) fn auth_id(self) -> u8 {
        match self.storage() {
            KeyStorage::Preset => 0x01,
            KeyStorage::Standard => self.0,
        }
    }
}

impl From<u8> for KeyId {
    fn from(value: u8) -> Self {
        KeyId(value)
    }
}
