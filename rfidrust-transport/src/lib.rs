//! Transport layer for rfidrust
//!
//! Provides the channel to a card: PC/SC for real readers and an
//! in-memory MIFARE Classic model for tests.

pub mod error;
pub mod memory;
pub mod pcsc;

pub use error::{Error, Result};
pub use memory::{MemoryCard, MemoryProvider};
pub use self::pcsc::{PcscProvider, PcscTransport};

use bytes::BytesMut;

/// Channel to one card
///
/// Calls block until the reader answers or the transport gives up.
pub trait Transport: Send {
    /// Send a command frame and return the raw response, status word included
    fn transmit(&mut self, command: &[u8]) -> Result<BytesMut>;
    
    /// Answer-To-Reset of the connected card
    fn atr(&self) -> Result<Vec<u8>>;
    
    /// Release the channel and reset the card
    fn disconnect(&mut self) -> Result<()>;
    
    /// Check if the channel is still held
    fn is_connected(&self) -> bool;
}

/// Source of reader channels
pub trait TransportProvider: Send {
    /// Names of the readers currently attached
    fn list_readers(&self) -> Result<Vec<String>>;
    
    /// Check if a card is in the field of `reader`
    fn is_card_present(&self, reader: &str) -> Result<bool>;
    
    /// Open a channel to the card on `reader`
    fn connect(&self, reader: &str) -> Result<Box<dyn Transport>>;
}
