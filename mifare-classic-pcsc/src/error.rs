#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to establish PC/SC context")]
    ContextInit(#[source] pcsc::Error),

    #[error("failed to list smart card readers")]
    ListReaders(#[source] pcsc::Error),

    #[error("reader name is not a valid string")]
    ReaderName,

    #[error("no smart card present in reader {0}")]
    NoCard(String),

    #[error("failed to connect to reader {0}")]
    Connect(String, #[source] pcsc::Error),

    #[error("APDU exchange failed")]
    Transmit(#[source] pcsc::Error),

    #[error("response of {0} bytes exceeds the caller's buffer")]
    ResponseTooLarge(usize),
}

impl From<Error> for mifare_classic_core::Error {
    fn from(err: Error) -> Self {
        mifare_classic_core::Error::Transport(err.to_string())
    }
}
