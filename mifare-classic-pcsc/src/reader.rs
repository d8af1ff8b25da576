use std::ffi::CString;

use tracing::debug;

use crate::{Error, PcscCard, PcscContext};

/// A smart card reader attached to the system.
pub struct PcscReader<'a> {
    name: String,
    context: &'a PcscContext,
}

impl<'a> PcscReader<'a> {
    pub(crate) fn new(name: String, context: &'a PcscContext) -> Self {
        PcscReader { name, context }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connects to the card currently present in this reader.
    pub fn connect(&self) -> Result<PcscCard, Error> {
        let c_name = CString::new(self.name.as_str()).map_err(|_| Error::ReaderName)?;

        match self.context.pcsc().connect(
            c_name.as_c_str(),
            pcsc::ShareMode::Exclusive,
            pcsc::Protocols::ANY,
        ) {
            Ok(card) => {
                debug!(reader = %self.name, "connected to card");
                Ok(PcscCard::new(card))
            }
            Err(pcsc::Error::RemovedCard | pcsc::Error::NoSmartcard) => {
                Err(Error::NoCard(self.name.clone()))
            }
            Err(err) => Err(Error::Connect(self.name.clone(), err)),
        }
    }
}
