//! Command frame construction and response stripping
//!
//! # Frame Structure
//!
//! ```text
//! ┌────────┬────────┬────────┬────────┬──────────────┬──────────────┐
//! │  CLA   │  INS   │   P1   │   P2   │   Lc / Le    │     Data     │
//! │ 1 byte │ 1 byte │ 1 byte │ 1 byte │    1 byte    │   Lc bytes   │
//! └────────┴────────┴────────┴────────┴──────────────┴──────────────┘
//! ```
//!
//! All frames here are reader pseudo-APDUs (CLA `FF`) as defined by
//! PC/SC part 3 and the reader vendors.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    constants::{BLOCK_SIZE, CLA_READER, KEY_SIZE, STATUS_WORD_SIZE, ins},
    error::{Error, Result},
};

/// Header length shared by every command frame
pub const HEADER_SIZE: usize = 5;

/// A single APDU command, immutable once built
#[derive(Clone, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Bytes,
}

impl CommandFrame {
    /// Build a frame from header fields and a data field
    ///
    /// The length byte is the data length, or `le` when there is no data.
    fn build(ins: u8, p1: u8, p2: u8, length: u8, data: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + data.len());

        buf.put_u8(CLA_READER);
        buf.put_u8(ins);
        buf.put_u8(p1);
        buf.put_u8(p2);
        buf.put_u8(length);
        buf.put_slice(data);

        Self { bytes: buf.freeze() }
    }

    /// Raw bytes to hand to the transport
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Instruction byte
    pub fn ins(&self) -> u8 {
        self.bytes[1]
    }

    /// Total frame size
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<CommandFrame> for Bytes {
    fn from(frame: CommandFrame) -> Bytes {
        frame.bytes
    }
}

impl fmt::Debug for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFrame")
            .field("ins", &format!("0x{:02X}", self.ins()))
            .field("len", &self.len())
            .field("bytes", &hex::encode_upper(&self.bytes))
            .finish()
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(&self.bytes))
    }
}

/// Load a 6 byte key into a reader key slot
///
/// `structure` is the vendor's key structure byte (P1).
pub fn load_key(structure: u8, slot: u8, key: &[u8; KEY_SIZE]) -> CommandFrame {
    CommandFrame::build(ins::LOAD_KEY, structure, slot, KEY_SIZE as u8, key)
}

/// Authenticate to a block using a previously loaded key slot (HID form)
///
/// ```text
/// FF 88 00 <block> <key type> <slot>
/// ```
pub fn authenticate(block: u8, key_type: u8, slot: u8) -> CommandFrame {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + 1);
    buf.put_u8(CLA_READER);
    buf.put_u8(ins::AUTHENTICATE);
    buf.put_u8(0x00);
    buf.put_u8(block);
    buf.put_u8(key_type);
    buf.put_u8(slot);

    CommandFrame { bytes: buf.freeze() }
}

/// General Authenticate (PC/SC part 3 form)
///
/// ```text
/// FF 86 00 00 05 | 01 00 <block> <key type> <slot>
/// ```
pub fn general_authenticate(block: u8, key_type: u8, slot: u8) -> CommandFrame {
    let data = [0x01, 0x00, block, key_type, slot];
    CommandFrame::build(ins::GENERAL_AUTHENTICATE, 0x00, 0x00, data.len() as u8, &data)
}

/// Get the card serial number
pub fn get_identifier() -> CommandFrame {
    CommandFrame::build(ins::GET_DATA, 0x00, 0x00, 0x00, &[])
}

/// Read one full block
pub fn read_block(block: u8) -> CommandFrame {
    CommandFrame::build(ins::READ_BINARY, 0x00, block, BLOCK_SIZE as u8, &[])
}

/// Write one full block
///
/// # Errors
///
/// Returns [`Error::InvalidBlockLength`] unless `data` is exactly one
/// block long.
pub fn write_block(block: u8, data: &[u8]) -> Result<CommandFrame> {
    if data.len() != BLOCK_SIZE {
        return Err(Error::InvalidBlockLength {
            expected: BLOCK_SIZE,
            actual: data.len(),
        });
    }

    Ok(CommandFrame::build(
        ins::UPDATE_BINARY,
        0x00,
        block,
        data.len() as u8,
        data,
    ))
}

/// Remove the trailing status word from a validated response
///
/// Only meaningful after [`crate::status::is_success`] returned true.
/// Frames shorter than the status word yield an empty payload.
pub fn strip_status(mut response: BytesMut) -> Bytes {
    let payload_len = response.len().saturating_sub(STATUS_WORD_SIZE);
    response.truncate(payload_len);
    response.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_KEY, key_slot, key_type};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_load_default_key() {
        let frame = load_key(0x20, key_slot::OMNIKEY, &DEFAULT_KEY);
        assert_eq!(
            frame.as_bytes(),
            &[0xFF, 0x82, 0x20, 0x1A, 0x06, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(frame.len(), 11);
    }

    #[test]
    fn test_authenticate() {
        let frame = authenticate(8, key_type::KEY_A, key_slot::OMNIKEY);
        assert_eq!(frame.as_bytes(), &[0xFF, 0x88, 0x00, 0x08, 0x60, 0x1A]);
    }

    #[test]
    fn test_general_authenticate() {
        let frame = general_authenticate(4, key_type::KEY_A, key_slot::ACS);
        assert_eq!(
            frame.as_bytes(),
            &[0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00, 0x04, 0x60, 0x00]
        );
    }

    #[test]
    fn test_get_identifier() {
        assert_eq!(get_identifier().as_bytes(), &[0xFF, 0xCA, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_read_block() {
        assert_eq!(read_block(0x3F).as_bytes(), &[0xFF, 0xB0, 0x00, 0x3F, 0x10]);
    }

    #[test]
    fn test_write_block() {
        let data: Vec<u8> = (0..16).collect();
        let frame = write_block(9, &data).unwrap();

        assert_eq!(&frame.as_bytes()[..HEADER_SIZE], &[0xFF, 0xD6, 0x00, 0x09, 0x10]);
        assert_eq!(&frame.as_bytes()[HEADER_SIZE..], data.as_slice());
        assert_eq!(frame.len(), 21);
    }

    #[test]
    fn test_write_block_wrong_length() {
        let result = write_block(1, &[0xAB; 15]);
        assert!(matches!(
            result,
            Err(Error::InvalidBlockLength { expected: 16, actual: 15 })
        ));

        assert!(write_block(1, &[]).is_err());
        assert!(write_block(1, &[0x00; 17]).is_err());
    }

    #[test]
    fn test_strip_status() {
        let response = BytesMut::from(&[0x01, 0x02, 0x03, 0x90, 0x00][..]);
        assert_eq!(strip_status(response).as_ref(), &[0x01, 0x02, 0x03]);

        let only_status = BytesMut::from(&[0x90, 0x00][..]);
        assert!(strip_status(only_status).is_empty());
    }

    #[test]
    fn test_strip_short_frame() {
        assert!(strip_status(BytesMut::from(&[0x90][..])).is_empty());
        assert!(strip_status(BytesMut::new()).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(read_block(1).to_string(), "FFB0000110");
    }

    proptest! {
        #[test]
        fn prop_write_appends_payload_verbatim(block in any::<u8>(), data in proptest::collection::vec(any::<u8>(), 16)) {
            let frame = write_block(block, &data).unwrap();
            prop_assert_eq!(frame.as_bytes()[3], block);
            prop_assert_eq!(frame.as_bytes()[4] as usize, data.len());
            prop_assert_eq!(&frame.as_bytes()[HEADER_SIZE..], data.as_slice());
        }
    }
}
