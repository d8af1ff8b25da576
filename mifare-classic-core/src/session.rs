//! The MIFARE command set of a connected card, one session per card.

use crate::block::Block;
use crate::error::Error;
use crate::key::{KeyId, KeyStorage, KeyType, MifareKey};
use crate::transport::{CardTransport, StatusWord};

// PC/SC pseudo-APDUs for contactless storage cards, class 0xFF.
const CLA: u8 = 0xFF;
const INS_GET_DATA: u8 = 0xCA;
const INS_LOAD_KEY: u8 = 0x82;
const INS_READ_BINARY: u8 = 0xB0;
const INS_UPDATE_BINARY: u8 = 0xD6;
const INS_GENERAL_AUTHENTICATE: u8 = 0x86;

// Load Key P1: plain volatile key location vs. the reader's preset key slots.
const LOAD_KEY_STANDARD: u8 = 0x20;
const LOAD_KEY_PRESET: u8 = 0x00;

// General Authenticate payload version byte.
const AUTH_VERSION: u8 = 0x01;

/// Response data of a single command; never more than one block.
struct Response {
    data: [u8; 16],
    len: usize,
    status: StatusWord,
}

/// A session with one physical card, wrapping a [`CardTransport`] with the
/// MIFARE Classic command set.
///
/// Every operation sends one command and waits for its response; the status
/// word of the most recent exchange is kept in a status register. Commands
/// other than [`authenticate`](Session::authenticate) fail with
/// [`Error::Status`] on anything but `90 00`.
pub struct Session<T: CardTransport> {
    transport: T,
    last_status: StatusWord,
}

impl<T: CardTransport> Session<T> {
    pub fn new(transport: T) -> Self {
        Session {
            transport,
            last_status: StatusWord::default(),
        }
    }

    /// The status word returned by the most recent command.
    pub fn last_status(&self) -> StatusWord {
        self.last_status
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Reads the 4-byte UID of the card.
    pub fn get_uid(&mut self) -> Result<[u8; 4], Error> {
        let response = self.command(&[CLA, INS_GET_DATA, 0x00, 0x00, 0x04])?;
        if response.len != 4 {
            return Err(Error::UnexpectedResponseLength {
                expected: 4,
                actual: response.len,
            });
        }
        let mut uid = [0u8; 4];
        uid.copy_from_slice(&response.data[..4]);
        Ok(uid)
    }

    /// Loads a key into the reader under the given key id.
    ///
    /// Preset ids select the reader's proprietary fixed-slot command variant,
    /// everything else the standard volatile load.
    pub fn load_key(&mut self, key_id: KeyId, key: &MifareKey) -> Result<(), Error> {
        let p1 = match key_id.storage() {
            KeyStorage::Preset => LOAD_KEY_PRESET,
            KeyStorage::Standard => LOAD_KEY_STANDARD,
        };

        let mut apdu = [0u8; 11];
        apdu[..5].copy_from_slice(&[CLA, INS_LOAD_KEY, p1, key_id.0, 0x06]);
        apdu[5..].copy_from_slice(key);
        self.command(&apdu).map(|_| ())
    }

    /// Reads one 16-byte block at its absolute address.
    pub fn read_block(&mut self, block: Block) -> Result<[u8; 16], Error> {
        let [hi, lo] = block.address();
        let response = self.command(&[CLA, INS_READ_BINARY, hi, lo, 0x10])?;
        if response.len != 16 {
            return Err(Error::UnexpectedResponseLength {
                expected: 16,
                actual: response.len,
            });
        }
        Ok(response.data)
    }

    /// Writes one 16-byte block at its absolute address.
    pub fn update_block(&mut self, block: Block, data: &[u8; 16]) -> Result<(), Error> {
        let [hi, lo] = block.address();
        let mut apdu = [0u8; 21];
        apdu[..5].copy_from_slice(&[CLA, INS_UPDATE_BINARY, hi, lo, 0x10]);
        apdu[5..].copy_from_slice(data);
        self.command(&apdu).map(|_| ())
    }

    /// Authenticates to the sector containing `block` with a previously
    /// loaded key.
    ///
    /// Returns `Ok(true)` iff the card accepted the key. A rejection is
    /// reported through the boolean, not as an error, so that callers can
    /// probe several keys without aborting; transport failures still error.
    pub fn authenticate(
        &mut self,
        block: Block,
        key_type: KeyType,
        key_id: KeyId,
    ) -> Result<bool, Error> {
        let [hi, lo] = block.address();
        let apdu = [
            CLA,
            INS_GENERAL_AUTHENTICATE,
            0x00,
            0x00,
            0x05,
            AUTH_VERSION,
            hi,
            lo,
            key_type.code(),
            key_id.auth_id(),
        ];
        let response = self.transceive(&apdu)?;
        Ok(response.status.is_ok())
    }

    /// Sends a command and fails on any status word other than `90 00`.
    fn command(&mut self, apdu: &[u8]) -> Result<Response, Error> {
        let response = self.transceive(apdu)?;
        if !response.status.is_ok() {
            return Err(Error::Status(response.status));
        }
        Ok(response)
    }

    /// Sends a command, splits off the status word and records it.
    fn transceive(&mut self, apdu: &[u8]) -> Result<Response, Error> {
        let mut buffer = [0u8; 32];
        let len = self.transport.transmit(apdu, &mut buffer)?;
        if len < 2 || len > 18 {
            return Err(Error::MalformedResponse(len));
        }

        let status = StatusWord {
            sw1: buffer[len - 2],
            sw2: buffer[len - 1],
        };
        self.last_status = status;

        let mut data = [0u8; 16];
        let data_len = len - 2;
        data[..data_len].copy_from_slice(&buffer[..data_len]);
        Ok(Response {
            data,
            len: data_len,
            status,
        })
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use super::*;
    use std::vec;
    use std::vec::Vec;

    /// Transport that records every APDU and plays back scripted responses.
    struct ScriptedTransport {
        sent: Vec<Vec<u8>>,
        responses: Vec<Vec<u8>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Vec<u8>>) -> Self {
            ScriptedTransport {
                sent: Vec::new(),
                responses,
            }
        }
    }

    impl CardTransport for ScriptedTransport {
        fn transmit(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, Error> {
            self.sent.push(command.to_vec());
            assert!(!self.responses.is_empty(), "unexpected command");
            let scripted = self.responses.remove(0);
            response[..scripted.len()].copy_from_slice(&scripted);
            Ok(scripted.len())
        }
    }

    fn session(responses: Vec<Vec<u8>>) -> Session<ScriptedTransport> {
        Session::new(ScriptedTransport::new(responses))
    }

    #[test]
    fn get_uid_sends_get_data_and_returns_four_bytes() {
        let mut s = session(vec![vec![0xDE, 0xAD, 0xBE, 0xEF, 0x90, 0x00]]);
        assert_eq!([0xDE, 0xAD, 0xBE, 0xEF], s.get_uid().unwrap());
        assert_eq!(vec![vec![0xFF, 0xCA, 0x00, 0x00, 0x04]], s.transport.sent);
        assert_eq!(StatusWord::OK, s.last_status());
    }

    #[test]
    fn get_uid_rejects_short_uid() {
        let mut s = session(vec![vec![0xDE, 0xAD, 0x90, 0x00]]);
        assert_eq!(
            Err(Error::UnexpectedResponseLength {
                expected: 4,
                actual: 2
            }),
            s.get_uid()
        );
    }

    #[test]
    fn load_key_uses_standard_variant_for_plain_ids() {
        let key = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut s = session(vec![vec![0x90, 0x00]]);
        s.load_key(KeyId(0x00), &key).unwrap();
        assert_eq!(
            vec![0xFF, 0x82, 0x20, 0x00, 0x06, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
            s.transport.sent[0]
        );
    }

    #[test]
    fn load_key_uses_preset_variant_for_magic_ids() {
        let key = [0xFF; 6];
        for id in [0x60u8, 0x61u8] {
            let mut s = session(vec![vec![0x90, 0x00]]);
            s.load_key(KeyId(id), &key).unwrap();
            assert_eq!(
                vec![0xFF, 0x82, 0x00, id, 0x06, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
                s.transport.sent[0]
            );
        }
    }

    #[test]
    fn load_key_fails_hard_on_bad_status() {
        let mut s = session(vec![vec![0x63, 0x00]]);
        assert_eq!(
            Err(Error::Status(StatusWord { sw1: 0x63, sw2: 0x00 })),
            s.load_key(KeyId(0x00), &[0xFF; 6])
        );
        assert_eq!(StatusWord { sw1: 0x63, sw2: 0x00 }, s.last_status());
    }

    #[test]
    fn read_block_splits_address_and_checks_length() {
        let data: Vec<u8> = (0u8..16).collect();
        let mut response = data.clone();
        response.extend([0x90, 0x00]);

        let mut s = session(vec![response]);
        let block = s.read_block(Block::from(57)).unwrap();
        assert_eq!(data.as_slice(), block.as_slice());
        assert_eq!(vec![0xFF, 0xB0, 0x00, 57, 0x10], s.transport.sent[0]);
    }

    #[test]
    fn read_block_rejects_truncated_data() {
        let mut s = session(vec![vec![0x01, 0x02, 0x03, 0x90, 0x00]]);
        assert_eq!(
            Err(Error::UnexpectedResponseLength {
                expected: 16,
                actual: 3
            }),
            s.read_block(Block::from(0))
        );
    }

    #[test]
    fn update_block_sends_sixteen_data_bytes() {
        let data = [0xABu8; 16];
        let mut s = session(vec![vec![0x90, 0x00]]);
        s.update_block(Block::from(6), &data).unwrap();

        let mut expected = vec![0xFF, 0xD6, 0x00, 6, 0x10];
        expected.extend(data);
        assert_eq!(expected, s.transport.sent[0]);
    }

    #[test]
    fn authenticate_payload_uses_version_address_type_and_id() {
        let mut s = session(vec![vec![0x90, 0x00]]);
        assert!(s
            .authenticate(Block::from(57), KeyType::KeyB, KeyId(0x05))
            .unwrap());
        assert_eq!(
            vec![0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00, 57, 0x61, 0x05],
            s.transport.sent[0]
        );
    }

    #[test]
    fn authenticate_substitutes_preset_ids_with_slot_one() {
        for id in [0x60u8, 0x61u8] {
            let mut s = session(vec![vec![0x90, 0x00]]);
            assert!(s
                .authenticate(Block::from(0), KeyType::KeyA, KeyId(id))
                .unwrap());
            assert_eq!(0x01, s.transport.sent[0][9]);
        }
    }

    #[test]
    fn authenticate_reports_rejection_as_false() {
        let mut s = session(vec![vec![0x63, 0x00]]);
        assert!(!s
            .authenticate(Block::from(0), KeyType::KeyA, KeyId(0x00))
            .unwrap());
        assert_eq!(StatusWord { sw1: 0x63, sw2: 0x00 }, s.last_status());
    }

    #[test]
    fn one_byte_response_is_malformed() {
        let mut s = session(vec![vec![0x90]]);
        assert_eq!(Err(Error::MalformedResponse(1)), s.get_uid());
    }
}
