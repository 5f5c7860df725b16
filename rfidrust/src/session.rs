//! High-level card session

use bytes::{Bytes, BytesMut};
use tracing::{debug, info, trace, warn};

use rfidrust_core::{
    Capacity, CommandFrame, CommandSet, MifareKey, ReaderFamily, Session, StatusWord,
    constants::{CARD_ID_SIZE, STATUS_WORD_SIZE},
    frame, status,
};
use rfidrust_transport::{PcscProvider, Transport, TransportProvider};
use rfidrust_types::{CardId, CardInfo};

use crate::error::{Error, Result};

/// Session with the card on one reader
///
/// Owns the channel to the card while it is open. Commands are sent one
/// at a time and block until the reader answers.
///
/// # Examples
///
/// ```no_run
/// use rfidrust::CardSession;
///
/// fn main() -> rfidrust::Result<()> {
///     let mut session = CardSession::pcsc("OMNIKEY CardMan 5x21-CL 0")?;
///
///     if !session.open()? {
///         println!("No card on the reader");
///         return Ok(());
///     }
///
///     if session.authenticate(4)? {
///         session.write(4, &[0x42; 16])?;
///         println!("{:02X?}", session.read(4)?);
///     }
///
///     session.close()?;
///     Ok(())
/// }
/// ```
pub struct CardSession {
    provider: Box<dyn TransportProvider>,
    reader_name: String,
    channel: Option<Box<dyn Transport>>,
    commands: Box<dyn CommandSet>,
    session: Session,
    key: MifareKey,
    family: Option<ReaderFamily>,
    atr: Vec<u8>,
}

impl CardSession {
    /// Create a closed session for `reader_name`, using `provider` for channels
    pub fn new(provider: Box<dyn TransportProvider>, reader_name: impl Into<String>) -> Self {
        Self {
            provider,
            reader_name: reader_name.into(),
            channel: None,
            commands: ReaderFamily::default().command_set(),
            session: Session::new(),
            key: MifareKey::default(),
            family: None,
            atr: Vec::new(),
        }
    }

    /// Create a closed session on a PC/SC reader
    pub fn pcsc(reader_name: impl Into<String>) -> Result<Self> {
        let provider = PcscProvider::new()?;
        Ok(Self::new(Box::new(provider), reader_name))
    }

    /// Set the key A used for authentication (default: factory key)
    pub fn with_key(mut self, key: MifareKey) -> Self {
        self.key = key;
        self
    }

    /// Force a reader dialect instead of detecting it from the reader name
    pub fn with_family(mut self, family: ReaderFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Check if a card is connected
    pub fn is_active(&self) -> bool {
        self.session.is_active() && self.channel.is_some()
    }

    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    /// Dialect in use while active
    pub fn family(&self) -> Option<ReaderFamily> {
        self.is_active().then(|| self.session.family())
    }

    /// Open a channel to the card on the reader
    ///
    /// Returns `Ok(false)` when no card is in the field; the session then
    /// stays closed.
    ///
    /// # Errors
    ///
    /// - [`Error::ReaderNotFound`] if the reader is not attached
    /// - [`Error::AlreadyOpen`] if the session is already active
    /// - [`Error::Transport`] if the channel cannot be established
    pub fn open(&mut self) -> Result<bool> {
        if self.is_active() {
            return Err(Error::AlreadyOpen(self.reader_name.clone()));
        }

        info!("Opening card session on {}...", self.reader_name);

        let readers = self.provider.list_readers()?;
        if !readers.iter().any(|r| *r == self.reader_name) {
            return Err(Error::ReaderNotFound(self.reader_name.clone()));
        }

        if !self.provider.is_card_present(&self.reader_name)? {
            debug!("No card present on {}", self.reader_name);
            return Ok(false);
        }

        let mut channel = match self.provider.connect(&self.reader_name) {
            Ok(channel) => channel,
            Err(e) if e.is_card_absent() => {
                debug!("Card left {} before connecting", self.reader_name);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let atr = match channel.atr() {
            Ok(atr) => atr,
            Err(e) => {
                if let Err(release) = channel.disconnect() {
                    warn!("Failed to release channel after ATR error: {}", release);
                }
                if e.is_card_absent() {
                    debug!("Card left {} while reading ATR", self.reader_name);
                    return Ok(false);
                }
                return Err(e.into());
            }
        };

        let capacity = Capacity::from_atr(&atr);
        let family = self
            .family
            .unwrap_or_else(|| ReaderFamily::detect(&self.reader_name));

        self.session.activate(family, capacity)?;
        self.commands = family.command_set();
        self.atr = atr;
        self.channel = Some(channel);

        info!(
            "Card session open (reader={}, family={}, capacity={})",
            self.reader_name, family, capacity
        );

        Ok(true)
    }

    /// Release the channel and forget everything cached for the card
    ///
    /// Safe to call on a closed session. Local state is cleared even when
    /// the transport fails to release the channel.
    pub fn close(&mut self) -> Result<()> {
        let channel = self.channel.take();

        self.session.close();
        self.commands = ReaderFamily::default().command_set();
        self.atr.clear();

        let Some(mut channel) = channel else {
            return Ok(());
        };

        info!("Closing card session on {}...", self.reader_name);

        channel.disconnect()?;

        info!("Card session closed");
        Ok(())
    }

    /// Authenticate to `block` with the configured key A
    ///
    /// Two round trips: load the key into the reader, then bind it to the
    /// block. Stops after the first if the reader rejects the key.
    pub fn authenticate(&mut self, block: u8) -> Result<bool> {
        if !self.ensure_active("authenticate") {
            return Ok(false);
        }

        let load = self.commands.load_key(&self.key);
        let response = self.exchange(&load)?;

        if !status::is_success(&response) {
            debug!("Key load rejected (block={}, sw={})", block, status_text(&response));
            return Ok(false);
        }

        let auth = self.commands.authenticate(block);
        let response = self.exchange(&auth)?;
        let authenticated = status::is_success(&response);

        debug!(
            "Authenticate block {}: {} (sw={})",
            block,
            authenticated,
            status_text(&response)
        );

        Ok(authenticated)
    }

    /// Read the card serial number
    ///
    /// `Ok(None)` if the card did not answer with one.
    pub fn identify(&mut self) -> Result<Option<CardId>> {
        if !self.ensure_active("identify") {
            return Ok(None);
        }

        let command = self.commands.get_identifier();
        let response = self.exchange(&command)?;

        if !status::is_success(&response) || response.len() < CARD_ID_SIZE + STATUS_WORD_SIZE {
            debug!("No card identifier (sw={})", status_text(&response));
            return Ok(None);
        }

        let card_id = CardId::from_response_bytes([
            response[0],
            response[1],
            response[2],
            response[3],
        ]);

        debug!("Card identifier: {}", card_id);

        Ok(Some(card_id))
    }

    /// Read one block
    ///
    /// `Ok(None)` if the card refused, e.g. the block is not authenticated.
    pub fn read(&mut self, block: u8) -> Result<Option<Bytes>> {
        if !self.ensure_active("read") {
            return Ok(None);
        }

        let command = self.commands.read_block(block);
        let response = self.exchange(&command)?;

        if !status::is_success(&response) {
            debug!("Read block {} refused (sw={})", block, status_text(&response));
            return Ok(None);
        }

        let data = frame::strip_status(response);
        debug!("Read block {}: {} bytes", block, data.len());

        Ok(Some(data))
    }

    /// Write one block
    ///
    /// `Ok(true)` means the card committed the whole block. On `Ok(false)`
    /// nothing can be assumed about the block contents.
    ///
    /// # Errors
    ///
    /// [`rfidrust_core::Error::InvalidBlockLength`] unless `data` is 16 bytes.
    pub fn write(&mut self, block: u8, data: &[u8]) -> Result<bool> {
        if !self.ensure_active("write") {
            return Ok(false);
        }

        let command = self.commands.write_block(block, data)?;
        let response = self.exchange(&command)?;
        let written = status::is_success(&response);

        debug!(
            "Write block {}: {} (sw={})",
            block,
            written,
            status_text(&response)
        );

        Ok(written)
    }

    /// Capacity resolved when the session opened
    pub fn capacity(&self) -> Capacity {
        if !self.ensure_active("capacity") {
            return Capacity::Unsupported;
        }

        self.session.capacity()
    }

    /// Total blocks on the card, `None` when unknown
    pub fn total_blocks(&self) -> Option<u16> {
        self.capacity().total_blocks()
    }

    /// Summary of the card in the field
    pub fn card_info(&mut self) -> Result<Option<CardInfo>> {
        if !self.ensure_active("card_info") {
            return Ok(None);
        }

        let card_id = self.identify()?;

        let info = CardInfo::new(self.reader_name.clone(), self.atr.clone())
            .with_card_id(card_id)
            .with_total_blocks(self.session.capacity().total_blocks());

        Ok(Some(info))
    }

    // Helper methods

    fn ensure_active(&self, operation: &str) -> bool {
        if self.is_active() {
            return true;
        }

        warn!("{} called on closed card session ({})", operation, self.reader_name);
        false
    }

    /// One round trip
    ///
    /// A card that left the field yields an empty response, which never
    /// validates. Every other transport failure is returned.
    fn exchange(&mut self, command: &CommandFrame) -> Result<BytesMut> {
        let Some(channel) = self.channel.as_mut() else {
            return Ok(BytesMut::new());
        };

        trace!("Sending: {:?}", command);

        match channel.transmit(command.as_bytes()) {
            Ok(response) => {
                trace!("Received: {:02X?}", &response[..]);
                Ok(response)
            }
            Err(e) if e.is_card_absent() => {
                debug!("Card left the field: {}", e);
                Ok(BytesMut::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for CardSession {
    fn drop(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            warn!("Card session on {} dropped while still open", self.reader_name);

            if let Err(e) = channel.disconnect() {
                warn!("Failed to release channel: {}", e);
            }
        }
    }
}

fn status_text(response: &[u8]) -> String {
    StatusWord::from_response(response)
        .map(|sw| sw.to_string())
        .unwrap_or_else(|| "none".to_string())
}
