//! PC/SC transport
//!
//! Talks to real readers through the platform smart card service
//! (pcsclite on Linux and macOS, WinSCard on Windows).

use std::ffi::CString;
use std::time::Duration;

use ::pcsc::{
    Attribute, Card, Context, Disposition, MAX_BUFFER_SIZE, Protocols, ReaderState, Scope,
    ShareMode, State,
};
use bytes::BytesMut;
use tracing::{debug, trace, warn};

use crate::{Transport, TransportProvider, error::*};

/// Reader source backed by a PC/SC context
pub struct PcscProvider {
    context: Context,
}

impl PcscProvider {
    /// Establish a user-scope PC/SC context
    pub fn new() -> Result<Self> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context })
    }

    fn reader_cstring(reader: &str) -> Result<CString> {
        CString::new(reader).map_err(|_| Error::InvalidReaderName(reader.to_string()))
    }
}

impl TransportProvider for PcscProvider {
    fn list_readers(&self) -> Result<Vec<String>> {
        let readers = match self.context.list_readers_owned() {
            Ok(readers) => readers,
            Err(::pcsc::Error::NoReadersAvailable) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(readers
            .into_iter()
            .map(|r| r.to_string_lossy().into_owned())
            .collect())
    }

    fn is_card_present(&self, reader: &str) -> Result<bool> {
        let name = Self::reader_cstring(reader)?;
        let mut states = [ReaderState::new(name, State::UNAWARE)];

        match self.context.get_status_change(Duration::ZERO, &mut states) {
            Ok(()) | Err(::pcsc::Error::Timeout) => {}
            Err(e) => return Err(e.into()),
        }

        let state = states[0].event_state();
        trace!("Reader {} state: {:?}", reader, state);

        if state.contains(State::UNKNOWN) {
            return Err(Error::UnknownReader(reader.to_string()));
        }

        Ok(state.contains(State::PRESENT) && !state.contains(State::MUTE))
    }

    fn connect(&self, reader: &str) -> Result<Box<dyn Transport>> {
        let name = Self::reader_cstring(reader)?;

        debug!("Connecting to card on {}...", reader);

        let card = self
            .context
            .connect(&name, ShareMode::Shared, Protocols::ANY)
            .map_err(|e| map_card_error(reader, e))?;

        debug!("Connected to card on {}", reader);

        Ok(Box::new(PcscTransport {
            reader: reader.to_string(),
            card: Some(card),
        }))
    }
}

/// Translate a PC/SC failure on `reader`
///
/// Only a card that is gone maps to [`Error::NoCard`]. A reset card is
/// still in the field but the channel is stale, so it stays a PC/SC error.
fn map_card_error(reader: &str, e: ::pcsc::Error) -> Error {
    match e {
        ::pcsc::Error::RemovedCard | ::pcsc::Error::NoSmartcard => Error::NoCard(reader.to_string()),
        ::pcsc::Error::UnknownReader => Error::UnknownReader(reader.to_string()),
        other => Error::Pcsc(other),
    }
}

/// Channel to a card behind a PC/SC reader
pub struct PcscTransport {
    reader: String,
    card: Option<Card>,
}

impl PcscTransport {
    /// Name of the reader this channel belongs to
    pub fn reader(&self) -> &str {
        &self.reader
    }

    fn card(&self) -> Result<&Card> {
        self.card.as_ref().ok_or(Error::NotConnected)
    }

}

impl Transport for PcscTransport {
    fn transmit(&mut self, command: &[u8]) -> Result<BytesMut> {
        let card = self.card()?;

        trace!("Sending {} bytes: {:02X?}", command.len(), command);

        let mut buf = [0u8; MAX_BUFFER_SIZE];
        let response = card
            .transmit(command, &mut buf)
            .map_err(|e| map_card_error(&self.reader, e))?;

        trace!("Received {} bytes: {:02X?}", response.len(), response);

        Ok(BytesMut::from(response))
    }

    fn atr(&self) -> Result<Vec<u8>> {
        let card = self.card()?;
        card.get_attribute_owned(Attribute::AtrString)
            .map_err(|e| map_card_error(&self.reader, e))
    }

    fn disconnect(&mut self) -> Result<()> {
        let Some(card) = self.card.take() else {
            return Ok(());
        };

        debug!("Disconnecting from card on {}...", self.reader);

        card.disconnect(Disposition::ResetCard)
            .map_err(|(_, e)| Error::Pcsc(e))
    }

    fn is_connected(&self) -> bool {
        self.card.is_some()
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("PC/SC transport for {} dropped while still connected", self.reader);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_name_with_nul_rejected() {
        let result = PcscProvider::reader_cstring("bad\0name");
        assert!(matches!(result, Err(Error::InvalidReaderName(_))));
    }

    #[test]
    fn test_card_gone_maps_to_no_card() {
        for e in [::pcsc::Error::RemovedCard, ::pcsc::Error::NoSmartcard] {
            let err = map_card_error("OMNIKEY 0", e);
            assert!(err.is_card_absent());
            assert!(matches!(err, Error::NoCard(reader) if reader == "OMNIKEY 0"));
        }
    }

    #[test]
    fn test_reset_card_stays_pcsc_error() {
        let err = map_card_error("OMNIKEY 0", ::pcsc::Error::ResetCard);
        assert!(!err.is_card_absent());
        assert!(matches!(err, Error::Pcsc(::pcsc::Error::ResetCard)));
    }

    #[test]
    fn test_other_errors_map() {
        assert!(matches!(
            map_card_error("r", ::pcsc::Error::UnknownReader),
            Error::UnknownReader(_)
        ));
        assert!(matches!(
            map_card_error("r", ::pcsc::Error::SharingViolation),
            Error::Pcsc(::pcsc::Error::SharingViolation)
        ));
    }

    #[test]
    #[ignore = "requires hardware: PC/SC service"]
    fn test_pcsc_list_readers() {
        let provider = PcscProvider::new().unwrap();
        let readers = provider.list_readers().unwrap();
        assert!(!readers.is_empty());
    }
}
