//! Card information structures

use std::fmt;

use crate::card_id::CardId;

/// Snapshot of the card in the field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    /// Reader the card was found on
    pub reader: String,

    /// Serial number, if the card answered
    pub card_id: Option<CardId>,

    /// Total blocks, if the card type is supported
    pub total_blocks: Option<u16>,

    /// Raw Answer-To-Reset
    pub atr: Vec<u8>,
}

impl CardInfo {
    pub fn new(reader: String, atr: Vec<u8>) -> Self {
        Self {
            reader,
            card_id: None,
            total_blocks: None,
            atr,
        }
    }

    pub fn with_card_id(mut self, card_id: Option<CardId>) -> Self {
        self.card_id = card_id;
        self
    }

    pub fn with_total_blocks(mut self, total_blocks: Option<u16>) -> Self {
        self.total_blocks = total_blocks;
        self
    }
}

impl fmt::Display for CardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .card_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let blocks = self
            .total_blocks
            .map(|blocks| blocks.to_string())
            .unwrap_or_else(|| "unsupported".to_string());

        write!(
            f,
            "Card[ID: {}, blocks: {}, reader: {}]",
            id, blocks, self.reader
        )
    }
}
