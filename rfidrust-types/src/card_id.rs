//! Card identifier

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Length of a card identifier in bytes
pub const CARD_ID_LEN: usize = 4;

/// Four byte card serial number in canonical (big-endian) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId([u8; CARD_ID_LEN]);

impl CardId {
    pub const fn new(bytes: [u8; CARD_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build from the serial bytes as they appear in a reader response
    ///
    /// Readers return the serial least significant byte first, so the
    /// bytes are reversed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rfidrust_types::CardId;
    ///
    /// let id = CardId::from_response_bytes([0xA1, 0xB2, 0xC3, 0xD4]);
    /// assert_eq!(id.as_bytes(), &[0xD4, 0xC3, 0xB2, 0xA1]);
    /// ```
    pub fn from_response_bytes(mut bytes: [u8; CARD_ID_LEN]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CARD_ID_LEN] {
        &self.0
    }

    /// Serial number as an unsigned integer
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Eight uppercase hex characters
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl From<[u8; CARD_ID_LEN]> for CardId {
    fn from(bytes: [u8; CARD_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for CardId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; CARD_ID_LEN] = bytes.try_into().map_err(|_| {
            Error::Validation(format!(
                "card identifier must be {} bytes, got {}",
                CARD_ID_LEN,
                bytes.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

impl FromStr for CardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::Parse(format!("{}: {}", s, e)))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Render a card identifier as text
///
/// Returns eight uppercase hex characters for exactly four bytes and an
/// empty string for anything else, including an absent identifier.
///
/// # Examples
///
/// ```
/// use rfidrust_types::format_card_id;
///
/// assert_eq!(format_card_id(Some(&[1, 2, 3, 4])), "01020304");
/// assert_eq!(format_card_id(Some(&[1, 2, 3])), "");
/// assert_eq!(format_card_id(None), "");
/// ```
pub fn format_card_id(bytes: Option<&[u8]>) -> String {
    match bytes {
        Some(bytes) if bytes.len() == CARD_ID_LEN => hex::encode_upper(bytes),
        _ => String::new(),
    }
}
