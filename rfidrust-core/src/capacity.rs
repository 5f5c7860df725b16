//! Card capacity detection from the ATR
//!
//! PC/SC part 3 readers synthesize an ATR for storage cards whose
//! historical bytes carry a two byte card name. Only the two MIFARE
//! Classic names are recognized; any other ATR shape is unsupported.

use std::fmt;

use tracing::trace;

use crate::constants::atr;

/// Total block count of the card in the field
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// MIFARE Classic 1K, 64 blocks
    Mifare1K,

    /// MIFARE Classic 4K, 255 addressable blocks
    Mifare4K,

    /// Capacity could not be determined
    #[default]
    Unsupported,
}

impl Capacity {
    /// Resolve capacity from ATR bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use rfidrust_core::Capacity;
    /// use rfidrust_core::constants::atr;
    ///
    /// assert_eq!(Capacity::from_atr(&atr::MIFARE_1K).total_blocks(), Some(64));
    /// assert_eq!(Capacity::from_atr(&[0x3B, 0x00]), Capacity::Unsupported);
    /// ```
    pub fn from_atr(bytes: &[u8]) -> Self {
        if bytes.len() != atr::MIFARE_LEN || bytes[atr::CARD_NAME_HIGH] != 0 {
            trace!(atr_len = bytes.len(), "ATR shape not recognized");
            return Self::Unsupported;
        }

        match bytes[atr::CARD_NAME_LOW] {
            1 => Self::Mifare1K,
            2 => Self::Mifare4K,
            other => {
                trace!(card_name = other, "Unknown card name in ATR");
                Self::Unsupported
            }
        }
    }

    /// Number of blocks, `None` when unsupported
    pub fn total_blocks(self) -> Option<u16> {
        match self {
            Self::Mifare1K => Some(64),
            Self::Mifare4K => Some(255),
            Self::Unsupported => None,
        }
    }

    /// Check if the block index exists on a card of this capacity
    pub fn contains(self, block: u8) -> bool {
        self.total_blocks().is_some_and(|total| u16::from(block) < total)
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_blocks() {
            Some(blocks) => write!(f, "{} blocks", blocks),
            None => write!(f, "unsupported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn atr_with(high: u8, low: u8) -> Vec<u8> {
        let mut bytes = atr::MIFARE_1K.to_vec();
        bytes[atr::CARD_NAME_HIGH] = high;
        bytes[atr::CARD_NAME_LOW] = low;
        bytes
    }

    #[test]
    fn test_known_cards() {
        assert_eq!(Capacity::from_atr(&atr::MIFARE_1K), Capacity::Mifare1K);
        assert_eq!(Capacity::from_atr(&atr::MIFARE_4K), Capacity::Mifare4K);
        assert_eq!(Capacity::Mifare1K.total_blocks(), Some(64));
        assert_eq!(Capacity::Mifare4K.total_blocks(), Some(255));
    }

    #[test]
    fn test_wrong_length_unsupported() {
        assert_eq!(Capacity::from_atr(&[]), Capacity::Unsupported);
        assert_eq!(Capacity::from_atr(&atr::MIFARE_1K[..19]), Capacity::Unsupported);

        let mut long = atr::MIFARE_1K.to_vec();
        long.push(0x00);
        assert_eq!(Capacity::from_atr(&long), Capacity::Unsupported);
    }

    #[test]
    fn test_nonzero_high_byte_unsupported() {
        assert_eq!(Capacity::from_atr(&atr_with(0x01, 0x01)), Capacity::Unsupported);
        assert_eq!(Capacity::from_atr(&atr_with(0xFF, 0x02)), Capacity::Unsupported);
    }

    #[test]
    fn test_unknown_card_name_unsupported() {
        // MIFARE Ultralight and friends
        assert_eq!(Capacity::from_atr(&atr_with(0x00, 0x03)), Capacity::Unsupported);
        assert_eq!(Capacity::from_atr(&atr_with(0x00, 0x00)), Capacity::Unsupported);
    }

    #[test]
    fn test_contains() {
        assert!(Capacity::Mifare1K.contains(63));
        assert!(!Capacity::Mifare1K.contains(64));
        assert!(Capacity::Mifare4K.contains(254));
        assert!(!Capacity::Mifare4K.contains(255));
        assert!(!Capacity::Unsupported.contains(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Capacity::Mifare1K.to_string(), "64 blocks");
        assert_eq!(Capacity::Unsupported.to_string(), "unsupported");
    }

    proptest! {
        #[test]
        fn prop_resolver_matches_rule(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let expected = if bytes.len() != 20 || bytes[13] != 0 {
                Capacity::Unsupported
            } else {
                match bytes[14] {
                    1 => Capacity::Mifare1K,
                    2 => Capacity::Mifare4K,
                    _ => Capacity::Unsupported,
                }
            };
            prop_assert_eq!(Capacity::from_atr(&bytes), expected);
        }

        #[test]
        fn prop_twenty_byte_atr(prefix in proptest::collection::vec(any::<u8>(), 13), low in any::<u8>(), rest in proptest::collection::vec(any::<u8>(), 5)) {
            let mut bytes = prefix;
            bytes.push(0x00);
            bytes.push(low);
            bytes.extend(rest);

            let capacity = Capacity::from_atr(&bytes);
            match low {
                1 => prop_assert_eq!(capacity.total_blocks(), Some(64)),
                2 => prop_assert_eq!(capacity.total_blocks(), Some(255)),
                _ => prop_assert_eq!(capacity, Capacity::Unsupported),
            }
        }
    }
}
