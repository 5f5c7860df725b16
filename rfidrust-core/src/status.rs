//! Response status word classification
//!
//! Every well-formed response ends in a two byte status word (SW1 SW2).
//! `90 00` is the only success value; everything else is a failure.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::constants::STATUS_WORD_SIZE;

/// Status word of an APDU response
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StatusWord(pub u16);

impl StatusWord {
    /// Command completed
    pub const SUCCESS: Self = Self(0x9000);

    /// Execution failed, no further information
    pub const NO_INFORMATION: Self = Self(0x6300);

    /// Wrong length in Lc or Le
    pub const WRONG_LENGTH: Self = Self(0x6700);

    /// Addressed block does not exist
    pub const FILE_NOT_FOUND: Self = Self(0x6A82);

    /// Instruction not supported
    pub const INS_NOT_SUPPORTED: Self = Self(0x6D00);

    /// Class not supported
    pub const CLA_NOT_SUPPORTED: Self = Self(0x6E00);

    /// Extract the status word from the tail of a response
    ///
    /// Returns `None` for frames shorter than two bytes.
    pub fn from_response(response: &[u8]) -> Option<Self> {
        if response.len() < STATUS_WORD_SIZE {
            return None;
        }

        let tail = &response[response.len() - STATUS_WORD_SIZE..];
        Some(Self(BigEndian::read_u16(tail)))
    }

    /// SW1
    pub fn sw1(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// SW2
    pub fn sw2(self) -> u8 {
        self.0 as u8
    }

    /// Check if this is `90 00`
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Encode as the two trailing response bytes
    pub fn to_bytes(self) -> [u8; STATUS_WORD_SIZE] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Check whether a response frame reports success
///
/// Frames shorter than two bytes are never valid. An absent response
/// should be passed as an empty slice.
///
/// # Examples
///
/// ```
/// use rfidrust_core::status;
///
/// assert!(status::is_success(&[0x00, 0x90, 0x00]));
/// assert!(!status::is_success(&[0x6A, 0x82]));
/// assert!(!status::is_success(&[0x90]));
/// ```
pub fn is_success(response: &[u8]) -> bool {
    StatusWord::from_response(response).is_some_and(StatusWord::is_success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_success_with_payload() {
        assert!(is_success(&[0x00, 0x90, 0x00]));
        assert!(is_success(&[0x90, 0x00]));
    }

    #[test]
    fn test_short_frames_invalid() {
        assert!(!is_success(&[]));
        assert!(!is_success(&[0x90]));
        assert!(!is_success(&[0x00]));
    }

    #[test]
    fn test_failure_words() {
        assert!(!is_success(&[0x6A, 0x82]));
        assert!(!is_success(&[0x63, 0x00]));
        assert!(!is_success(&[0x90, 0x01]));
        assert!(!is_success(&[0x91, 0x00]));
    }

    #[test]
    fn test_only_trailing_bytes_count() {
        // Success word in the payload does not make the frame valid
        assert!(!is_success(&[0x90, 0x00, 0x63, 0x00]));
        assert!(is_success(&[0x63, 0x00, 0x90, 0x00]));
    }

    #[test]
    fn test_status_word_parts() {
        let sw = StatusWord::from_response(&[0x01, 0x6A, 0x82]).unwrap();
        assert_eq!(sw, StatusWord::FILE_NOT_FOUND);
        assert_eq!(sw.sw1(), 0x6A);
        assert_eq!(sw.sw2(), 0x82);
        assert_eq!(sw.to_string(), "6A82");
        assert_eq!(StatusWord::SUCCESS.to_bytes(), [0x90, 0x00]);
    }

    #[test]
    fn test_status_word_absent() {
        assert_eq!(StatusWord::from_response(&[0x90]), None);
    }

    proptest! {
        #[test]
        fn prop_valid_iff_trailing_9000(frame in proptest::collection::vec(any::<u8>(), 0..64)) {
            let expected = frame.len() >= 2
                && frame[frame.len() - 2] == 0x90
                && frame[frame.len() - 1] == 0x00;
            prop_assert_eq!(is_success(&frame), expected);
        }

        #[test]
        fn prop_payload_never_matters(
            payload in proptest::collection::vec(any::<u8>(), 0..64),
            sw1 in any::<u8>(),
            sw2 in any::<u8>(),
        ) {
            let mut frame = payload;
            frame.extend_from_slice(&[sw1, sw2]);
            prop_assert_eq!(is_success(&frame), sw1 == 0x90 && sw2 == 0x00);
        }
    }
}
