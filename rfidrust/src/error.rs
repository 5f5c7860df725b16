//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a card session
///
/// A card refusing a command is not an error: operations report it as
/// `Ok(false)` or `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] rfidrust_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] rfidrust_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] rfidrust_types::Error),

    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    #[error("Session already open on {0}")]
    AlreadyOpen(String),
}

impl Error {
    /// Check if the underlying channel failed
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
