//! # rfidrust
//!
//! Read and write MIFARE Classic cards through PC/SC contactless readers.
//!
//! ## Features
//!
//! - HID OMNIKEY and ACS reader dialects, picked from the reader name
//! - MIFARE Classic 1K / 4K capacity detection from the ATR
//! - Blocking API, one command in flight at a time
//! - In-memory card model for tests without hardware
//!
//! ## Quick Start
//!
//! ```no_run
//! use rfidrust::CardSession;
//!
//! fn main() -> rfidrust::Result<()> {
//!     let mut session = CardSession::pcsc("OMNIKEY CardMan 5x21-CL 0")?;
//!
//!     if session.open()? {
//!         if let Some(info) = session.card_info()? {
//!             println!("{}", info);
//!         }
//!
//!         session.close()?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod session;

// Re-exports
pub use error::{Error, Result};
pub use session::CardSession;

// Re-export protocol and transport types
pub use rfidrust_core::{Capacity, MifareKey, ReaderFamily, StatusWord};
pub use rfidrust_transport::{
    MemoryCard, MemoryProvider, PcscProvider, Transport, TransportProvider,
};
pub use rfidrust_types::{CardId, CardInfo, format_card_id};
