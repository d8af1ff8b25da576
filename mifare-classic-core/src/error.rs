use crate::block::BlockOffset;
use crate::transport::StatusWord;

/// Errors from MIFARE Classic operations.
///
/// Any command that completes with a status word other than `90 00` fails
/// with [`Error::Status`]; the one exception is authentication, which reports
/// card-side rejection as `Ok(false)` so that callers can probe several keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Command completed with an unexpected status word.
    #[error("unexpected status word {0}")]
    Status(StatusWord),

    /// Failed to authenticate to a sector with the configured key.
    #[error("authentication failed for sector {0}")]
    AuthenticationFailed(u8),

    /// Invalid value for a MIFARE Classic sector.
    #[error("invalid sector number {0}, expected 0..=39")]
    InvalidSector(u8),

    /// Invalid value for a block offset within a sector.
    #[error("invalid block offset {0}, expected 0..=3")]
    InvalidBlockOffset(u8),

    /// Invalid value for a 3-bit access condition.
    #[error("invalid access condition value {0}, expected 0..=7")]
    InvalidAccessCondition(u8),

    /// The operation needs a block that has not been read into the sector
    /// cache yet.
    #[error("sector block {0} has not been read")]
    BlockNotLoaded(BlockOffset),

    /// The response data had a different length than the command asked for.
    #[error("expected {expected} bytes of response data, got {actual}")]
    UnexpectedResponseLength { expected: usize, actual: usize },

    /// The response was too short to carry a status word, or too long for
    /// any command in the MIFARE command set.
    #[error("malformed response of {0} bytes")]
    MalformedResponse(usize),

    /// Low-level PCSC or transport error.
    #[cfg(feature = "std")]
    #[error("transport error: {0}")]
    Transport(std::string::String),
    #[cfg(not(feature = "std"))]
    #[error("transport error: {0}")]
    Transport(heapless::String<64>),
}
