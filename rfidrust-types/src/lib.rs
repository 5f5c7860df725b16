//! Type definitions for rfidrust

pub mod card_id;
pub mod card_info;
pub mod error;

pub use card_id::{CardId, format_card_id};
pub use card_info::CardInfo;
pub use error::{Error, Result};
