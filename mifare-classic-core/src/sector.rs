//! Sector state: a lazily populated block cache plus key addressing, with
//! helpers for editing the trailer in place.

use crate::access::{AccessBits, AccessCondition};
use crate::block::{BlockOffset, SectorIndex};
use crate::error::Error;
use crate::key::{KeyId, KeyType, MifareKey, PUBLIC_KEYS};
use crate::session::Session;
use crate::transport::CardTransport;

// Trailer layout: Key A, access bits, general purpose byte, Key B.
const KEY_A_OFFSET: usize = 0;
const ACCESS_BITS_OFFSET: usize = 6;
const GPB_OFFSET: usize = 9;
const KEY_B_OFFSET: usize = 10;

/// One MIFARE Classic sector of four blocks: three data blocks and the
/// trailer.
///
/// The sector owns a pair of reader key ids (one per key type, defaulting to
/// the reader's preset slots) and caches every block it reads. Trailer edits
/// ([`set_key_a`](Sector::set_key_a), access-condition changes, ...) operate
/// on the cached trailer only; persist them with
/// [`update`](Sector::update)`(session, BlockOffset::TRAILER, None)`.
#[derive(Debug)]
pub struct Sector {
    index: SectorIndex,
    key_ids: [KeyId; 2],
    blocks: [Option<[u8; 16]>; 4],
}

impl Sector {
    pub fn new(index: SectorIndex) -> Self {
        Sector {
            index,
            // Default to the reader's preset slots for both key types.
            key_ids: [KeyId(0x60), KeyId(0x61)],
            blocks: [None; 4],
        }
    }

    pub fn index(&self) -> SectorIndex {
        self.index
    }

    /// The cached contents of a block, if it has been read.
    pub fn block(&self, offset: BlockOffset) -> Option<&[u8; 16]> {
        self.blocks[offset as usize].as_ref()
    }

    /// The reader key id used when authenticating with the given key type.
    pub fn key_id(&self, key_type: KeyType) -> KeyId {
        self.key_ids[key_type.slot()]
    }

    /// Overwrites the reader key id for the given key type.
    pub fn set_key_id(&mut self, key_type: KeyType, key_id: KeyId) {
        self.key_ids[key_type.slot()] = key_id;
    }

    /// Reads one block of this sector, caching the result.
    pub fn read<T: CardTransport>(
        &mut self,
        session: &mut Session<T>,
        offset: BlockOffset,
    ) -> Result<[u8; 16], Error> {
        let data = session.read_block(self.index.block(offset))?;
        self.blocks[offset as usize] = Some(data);
        Ok(data)
    }

    /// Writes one block of this sector.
    ///
    /// With `Some(data)` the new contents are cached and written; with `None`
    /// the currently cached block is re-sent unchanged, which is how in-place
    /// trailer edits are persisted. The `None` path requires the block to
    /// have been read first.
    pub fn update<T: CardTransport>(
        &mut self,
        session: &mut Session<T>,
        offset: BlockOffset,
        data: Option<[u8; 16]>,
    ) -> Result<(), Error> {
        let data = match data {
            Some(data) => {
                self.blocks[offset as usize] = Some(data);
                data
            }
            None => self.blocks[offset as usize].ok_or(Error::BlockNotLoaded(offset))?,
        };
        session.update_block(self.index.block(offset), &data)
    }

    /// Authenticates to this sector with the stored key id for `key_type`.
    pub fn authenticate<T: CardTransport>(
        &mut self,
        session: &mut Session<T>,
        offset: BlockOffset,
        key_type: KeyType,
    ) -> Result<bool, Error> {
        session.authenticate(self.index.block(offset), key_type, self.key_id(key_type))
    }

    /// Probes the well-known public keys in table order, loading each into
    /// the reader under this sector's key id before trying it.
    ///
    /// Returns the index of the first key the card accepts and stops probing;
    /// `None` if all candidates are rejected.
    pub fn authenticate_public<T: CardTransport>(
        &mut self,
        session: &mut Session<T>,
        offset: BlockOffset,
        key_type: KeyType,
    ) -> Result<Option<usize>, Error> {
        for (i, key) in PUBLIC_KEYS.iter().enumerate() {
            session.load_key(self.key_id(key_type), key)?;
            if self.authenticate(session, offset, key_type)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Authenticates once against block 0, then reads all four blocks in
    /// order and returns them concatenated.
    ///
    /// The card remembers a successful authentication for the whole sector,
    /// so no per-block re-authentication happens.
    pub fn read_all<T: CardTransport>(
        &mut self,
        session: &mut Session<T>,
        key_type: KeyType,
    ) -> Result<[u8; 64], Error> {
        if !self.authenticate(session, BlockOffset::B0, key_type)? {
            return Err(Error::AuthenticationFailed(self.index.into()));
        }

        let mut out = [0u8; 64];
        for offset in BlockOffset::ALL {
            let data = self.read(session, offset)?;
            out[offset as usize * 16..][..16].copy_from_slice(&data);
        }
        Ok(out)
    }

    /// Overwrites Key A (bytes 0..6) in the cached trailer.
    pub fn set_key_a(&mut self, key: &MifareKey) -> Result<(), Error> {
        let trailer = self.trailer_mut()?;
        trailer[KEY_A_OFFSET..KEY_A_OFFSET + 6].copy_from_slice(key);
        Ok(())
    }

    /// Overwrites Key B (bytes 10..16) in the cached trailer.
    pub fn set_key_b(&mut self, key: &MifareKey) -> Result<(), Error> {
        let trailer = self.trailer_mut()?;
        trailer[KEY_B_OFFSET..KEY_B_OFFSET + 6].copy_from_slice(key);
        Ok(())
    }

    /// Overwrites the general purpose byte (byte 9) in the cached trailer.
    pub fn set_general_purpose_byte(&mut self, gpb: u8) -> Result<(), Error> {
        self.trailer_mut()?[GPB_OFFSET] = gpb;
        Ok(())
    }

    /// Decodes the access field from the cached trailer.
    pub fn access_bits(&self) -> Result<AccessBits, Error> {
        let trailer = self.trailer()?;
        Ok(AccessBits::from_bytes([
            trailer[ACCESS_BITS_OFFSET],
            trailer[ACCESS_BITS_OFFSET + 1],
            trailer[ACCESS_BITS_OFFSET + 2],
        ]))
    }

    /// The access condition of one block, from the cached trailer.
    pub fn access_condition(&self, offset: BlockOffset) -> Result<AccessCondition, Error> {
        Ok(self.access_bits()?.of(offset))
    }

    /// Replaces one block's access condition in the cached trailer, keeping
    /// the other blocks' conditions and recomputing the complement nibbles.
    pub fn set_access_condition(
        &mut self,
        offset: BlockOffset,
        condition: AccessCondition,
    ) -> Result<(), Error> {
        let mut bits = self.access_bits()?;
        bits.set(offset, condition);

        let encoded = bits.to_bytes();
        let trailer = self.trailer_mut()?;
        trailer[ACCESS_BITS_OFFSET..ACCESS_BITS_OFFSET + 3].copy_from_slice(&encoded);
        Ok(())
    }

    fn trailer(&self) -> Result<&[u8; 16], Error> {
        self.blocks[BlockOffset::TRAILER as usize]
            .as_ref()
            .ok_or(Error::BlockNotLoaded(BlockOffset::TRAILER))
    }

    fn trailer_mut(&mut self) -> Result<&mut [u8; 16], Error> {
        self.blocks[BlockOffset::TRAILER as usize]
            .as_mut()
            .ok_or(Error::BlockNotLoaded(BlockOffset::TRAILER))
    }
}
