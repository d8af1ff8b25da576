use mifare_classic_core::CardTransport;
use tracing::trace;

use crate::Error;

/// A connected card, exchanging raw command APDUs over PC/SC.
pub struct PcscCard {
    card: pcsc::Card,
}

impl PcscCard {
    pub(crate) fn new(card: pcsc::Card) -> Self {
        PcscCard { card }
    }
}

impl CardTransport for PcscCard {
    fn transmit(
        &mut self,
        command: &[u8],
        response: &mut [u8],
    ) -> Result<usize, mifare_classic_core::Error> {
        trace!(command = ?command, ">> TX");

        let mut buffer = [0u8; pcsc::MAX_BUFFER_SIZE];
        let received = self
            .card
            .transmit(command, &mut buffer)
            .map_err(Error::Transmit)?;
        trace!(response = ?received, "<< RX");

        if received.len() > response.len() {
            return Err(Error::ResponseTooLarge(received.len()).into());
        }
        response[..received.len()].copy_from_slice(received);
        Ok(received.len())
    }
}
