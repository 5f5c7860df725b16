//! Transport errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,
    
    #[error("Unknown reader: {0}")]
    UnknownReader(String),
    
    #[error("No card in reader {0}")]
    NoCard(String),
    
    #[error("Invalid reader name: {0}")]
    InvalidReaderName(String),
    
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),
}

impl Error {
    /// Check if the card left the field (or was never there)
    pub fn is_card_absent(&self) -> bool {
        matches!(self, Self::NoCard(_))
    }
}
