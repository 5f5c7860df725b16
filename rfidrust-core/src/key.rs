//! MIFARE sector keys

use std::fmt;

use crate::constants::{DEFAULT_KEY, KEY_SIZE};

/// A 6 byte MIFARE Classic key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MifareKey([u8; KEY_SIZE]);

impl MifareKey {
    pub const fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl Default for MifareKey {
    /// The factory default `FF FF FF FF FF FF`
    fn default() -> Self {
        Self(DEFAULT_KEY)
    }
}

impl From<[u8; KEY_SIZE]> for MifareKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

// Keys never show up in logs
impl fmt::Debug for MifareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == DEFAULT_KEY {
            f.write_str("MifareKey(default)")
        } else {
            f.write_str("MifareKey(..)")
        }
    }
}
