//! In-memory MIFARE Classic card
//!
//! A deterministic stand-in for a reader with a card in its field. The
//! model understands both the HID OMNIKEY and the PC/SC part 3 (ACS)
//! authentication frames, keeps one key A per sector, and only allows
//! reads and writes to the sector that was last authenticated.
//!
//! Sector trailers are plain storage here; writing one does not change
//! the sector key.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use parking_lot::Mutex;
use tracing::{debug, trace};

use rfidrust_core::{
    Capacity, StatusWord,
    constants::{BLOCK_SIZE, CLA_READER, DEFAULT_KEY, KEY_SIZE, atr, ins, key_type},
};

use crate::{Transport, TransportProvider, error::*};

type Block = [u8; BLOCK_SIZE];
type Key = [u8; KEY_SIZE];

/// Sector that holds `block`
///
/// The first 32 sectors have 4 blocks, the upper 8 sectors of a 4K card
/// have 16.
pub fn sector_of(block: u8) -> u8 {
    if block < 128 {
        block / 4
    } else {
        32 + (block - 128) / 16
    }
}

#[derive(Debug)]
struct CardState {
    /// Serial as the reader reports it (least significant byte first)
    uid: [u8; 4],
    atr: Vec<u8>,
    blocks: Vec<Block>,
    sector_keys: HashMap<u8, Key>,
    reader_keys: HashMap<u8, Key>,
    authenticated: Option<u8>,
    present: bool,
    connected: bool,
    transmitted: Vec<Vec<u8>>,
}

impl CardState {
    fn process(&mut self, apdu: &[u8]) -> (Vec<u8>, StatusWord) {
        if apdu.len() < 5 {
            return (Vec::new(), StatusWord::WRONG_LENGTH);
        }

        if apdu[0] != CLA_READER {
            return (Vec::new(), StatusWord::CLA_NOT_SUPPORTED);
        }

        let (p1, p2, p3) = (apdu[2], apdu[3], apdu[4]);
        let body = &apdu[5..];

        match apdu[1] {
            ins::LOAD_KEY => {
                let Ok(key) = Key::try_from(body) else {
                    return (Vec::new(), StatusWord::WRONG_LENGTH);
                };
                if usize::from(p3) != KEY_SIZE {
                    return (Vec::new(), StatusWord::WRONG_LENGTH);
                }

                self.reader_keys.insert(p2, key);
                (Vec::new(), StatusWord::SUCCESS)
            }
            ins::AUTHENTICATE => match body {
                [slot] => (Vec::new(), self.authenticate(p2, p3, *slot)),
                _ => (Vec::new(), StatusWord::WRONG_LENGTH),
            },
            ins::GENERAL_AUTHENTICATE => match body {
                [0x01, 0x00, block, kind, slot] if p3 == 5 => {
                    (Vec::new(), self.authenticate(*block, *kind, *slot))
                }
                _ => (Vec::new(), StatusWord::WRONG_LENGTH),
            },
            ins::GET_DATA if p1 == 0x00 => (self.uid.to_vec(), StatusWord::SUCCESS),
            ins::GET_DATA => (Vec::new(), StatusWord::FILE_NOT_FOUND),
            ins::READ_BINARY => {
                if usize::from(p3) != BLOCK_SIZE || !body.is_empty() {
                    return (Vec::new(), StatusWord::WRONG_LENGTH);
                }
                match self.check_access(p2) {
                    StatusWord::SUCCESS => {
                        (self.blocks[usize::from(p2)].to_vec(), StatusWord::SUCCESS)
                    }
                    sw => (Vec::new(), sw),
                }
            }
            ins::UPDATE_BINARY => {
                let Ok(data) = Block::try_from(body) else {
                    return (Vec::new(), StatusWord::WRONG_LENGTH);
                };
                if usize::from(p3) != BLOCK_SIZE {
                    return (Vec::new(), StatusWord::WRONG_LENGTH);
                }
                let sw = self.check_access(p2);
                if sw.is_success() {
                    self.blocks[usize::from(p2)] = data;
                }
                (Vec::new(), sw)
            }
            _ => (Vec::new(), StatusWord::INS_NOT_SUPPORTED),
        }
    }

    fn authenticate(&mut self, block: u8, kind: u8, slot: u8) -> StatusWord {
        self.authenticated = None;

        if usize::from(block) >= self.blocks.len() {
            return StatusWord::FILE_NOT_FOUND;
        }

        // Only key A is modelled
        if kind != key_type::KEY_A {
            return StatusWord::NO_INFORMATION;
        }

        let Some(loaded) = self.reader_keys.get(&slot) else {
            return StatusWord::NO_INFORMATION;
        };

        let sector = sector_of(block);
        let expected = self.sector_keys.get(&sector).unwrap_or(&DEFAULT_KEY);

        if loaded == expected {
            self.authenticated = Some(sector);
            StatusWord::SUCCESS
        } else {
            StatusWord::NO_INFORMATION
        }
    }

    fn check_access(&self, block: u8) -> StatusWord {
        if usize::from(block) >= self.blocks.len() {
            StatusWord::FILE_NOT_FOUND
        } else if self.authenticated != Some(sector_of(block)) {
            StatusWord::NO_INFORMATION
        } else {
            StatusWord::SUCCESS
        }
    }

    fn reset(&mut self) {
        self.authenticated = None;
        self.reader_keys.clear();
        self.connected = false;
    }
}

/// Handle to a simulated card
///
/// Clones share the same card, so a test can keep one handle while the
/// session owns the transport.
#[derive(Debug, Clone)]
pub struct MemoryCard {
    state: Arc<Mutex<CardState>>,
}

impl MemoryCard {
    /// Blank card of the given capacity with an all-zero store
    ///
    /// An unsupported capacity gets a 64 block store and an ATR that does
    /// not name a MIFARE Classic card.
    pub fn new(capacity: Capacity) -> Self {
        let atr = match capacity {
            Capacity::Mifare1K => atr::MIFARE_1K.to_vec(),
            Capacity::Mifare4K => atr::MIFARE_4K.to_vec(),
            Capacity::Unsupported => vec![0x3B, 0x81, 0x80, 0x01, 0x80, 0x80],
        };
        let total = capacity.total_blocks().unwrap_or(64);

        Self {
            state: Arc::new(Mutex::new(CardState {
                uid: [0x04, 0x03, 0x02, 0x01],
                atr,
                blocks: vec![[0u8; BLOCK_SIZE]; usize::from(total)],
                sector_keys: HashMap::new(),
                reader_keys: HashMap::new(),
                authenticated: None,
                present: true,
                connected: false,
                transmitted: Vec::new(),
            })),
        }
    }

    pub fn mifare_1k() -> Self {
        Self::new(Capacity::Mifare1K)
    }

    pub fn mifare_4k() -> Self {
        Self::new(Capacity::Mifare4K)
    }

    /// Set the serial in the byte order the reader reports it
    pub fn with_uid(self, uid: [u8; 4]) -> Self {
        self.state.lock().uid = uid;
        self
    }

    pub fn with_atr(self, atr: impl Into<Vec<u8>>) -> Self {
        self.state.lock().atr = atr.into();
        self
    }

    /// Replace the factory key A of one sector
    pub fn with_sector_key(self, sector: u8, key: [u8; KEY_SIZE]) -> Self {
        self.state.lock().sector_keys.insert(sector, key);
        self
    }

    pub fn with_block(self, block: u8, data: [u8; BLOCK_SIZE]) -> Self {
        if let Some(slot) = self.state.lock().blocks.get_mut(usize::from(block)) {
            *slot = data;
        }
        self
    }

    /// Card starts outside the reader field
    pub fn removed(self) -> Self {
        self.state.lock().present = false;
        self
    }

    /// Take the card out of the field
    ///
    /// The card loses its authentication. A transport holding it stays
    /// connected and reports the card absent until it comes back.
    pub fn remove(&self) {
        let mut state = self.state.lock();
        state.present = false;
        state.authenticated = None;
    }

    /// Put the card back in the field
    pub fn insert(&self) {
        self.state.lock().present = true;
    }

    pub fn is_present(&self) -> bool {
        self.state.lock().present
    }

    /// Check if a transport currently holds this card
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Current contents of a block
    pub fn block(&self, block: u8) -> Option<[u8; BLOCK_SIZE]> {
        self.state.lock().blocks.get(usize::from(block)).copied()
    }

    /// Every command frame received so far, oldest first
    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.state.lock().transmitted.clone()
    }
}

/// Channel to a [`MemoryCard`]
#[derive(Debug)]
pub struct MemoryTransport {
    reader: String,
    card: MemoryCard,
    connected: bool,
}

impl Transport for MemoryTransport {
    fn transmit(&mut self, command: &[u8]) -> Result<BytesMut> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let mut state = self.card.state.lock();
        if !state.present {
            return Err(Error::NoCard(self.reader.clone()));
        }

        state.transmitted.push(command.to_vec());

        let (data, sw) = state.process(command);
        trace!("Simulated card answered {} with {} data bytes", sw, data.len());

        let mut response = BytesMut::with_capacity(data.len() + 2);
        response.put_slice(&data);
        response.put_slice(&sw.to_bytes());

        Ok(response)
    }

    fn atr(&self) -> Result<Vec<u8>> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let state = self.card.state.lock();
        if !state.present {
            return Err(Error::NoCard(self.reader.clone()));
        }

        Ok(state.atr.clone())
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.connected {
            debug!("Disconnecting from simulated card on {}", self.reader);
            self.card.state.lock().reset();
            self.connected = false;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Reader source holding simulated readers
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    readers: Vec<(String, Option<MemoryCard>)>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reader, optionally with a card on it
    pub fn with_reader(mut self, name: impl Into<String>, card: Option<MemoryCard>) -> Self {
        self.readers.push((name.into(), card));
        self
    }

    fn card(&self, reader: &str) -> Result<Option<&MemoryCard>> {
        self.readers
            .iter()
            .find(|(name, _)| name == reader)
            .map(|(_, card)| card.as_ref())
            .ok_or_else(|| Error::UnknownReader(reader.to_string()))
    }
}

impl TransportProvider for MemoryProvider {
    fn list_readers(&self) -> Result<Vec<String>> {
        Ok(self.readers.iter().map(|(name, _)| name.clone()).collect())
    }

    fn is_card_present(&self, reader: &str) -> Result<bool> {
        Ok(self.card(reader)?.is_some_and(MemoryCard::is_present))
    }

    fn connect(&self, reader: &str) -> Result<Box<dyn Transport>> {
        let card = match self.card(reader)? {
            Some(card) if card.is_present() => card.clone(),
            _ => return Err(Error::NoCard(reader.to_string())),
        };

        card.state.lock().connected = true;

        Ok(Box::new(MemoryTransport {
            reader: reader.to_string(),
            card,
            connected: true,
        }))
    }
}
