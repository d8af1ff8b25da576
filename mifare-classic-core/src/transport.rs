use core::fmt;

use crate::error::Error;

/// 2-byte status word returned by the reader after every command.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StatusWord {
    pub sw1: u8,
    pub sw2: u8,
}

impl StatusWord {
    /// `90 00`, the only status word accepted as success.
    pub const OK: StatusWord = StatusWord {
        sw1: 0x90,
        sw2: 0x00,
    };

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

/// Trait for sending raw command APDUs to a reader.
pub trait CardTransport {
    /// Transmits a command APDU and writes the full response, including the
    /// trailing status word, into `response`. Returns the response length.
    fn transmit(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, Error>;
}
