use crate::{Error, PcscReader};

/// An established PC/SC context, the entry point for reader enumeration.
pub struct PcscContext {
    context: pcsc::Context,
}

impl PcscContext {
    pub fn establish() -> Result<PcscContext, Error> {
        let context =
            pcsc::Context::establish(pcsc::Scope::User).map_err(Error::ContextInit)?;
        Ok(PcscContext { context })
    }

    pub(crate) fn pcsc(&self) -> &pcsc::Context {
        &self.context
    }

    /// Lists the currently attached smart card readers.
    pub fn readers(&self) -> Result<Vec<PcscReader<'_>>, Error> {
        self.context
            .list_readers_owned()
            .map_err(Error::ListReaders)?
            .into_iter()
            .map(|name| {
                let name = name.into_string().map_err(|_| Error::ReaderName)?;
                Ok(PcscReader::new(name, self))
            })
            .collect()
    }
}
