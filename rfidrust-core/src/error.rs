//! Error types for rfidrust-core

/// Result type alias for rfidrust-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
///
/// These are caller precondition failures. A card answering with a
/// non-success status word is not an error at this layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Write payload does not fill exactly one block
    #[error("Invalid block length: expected {expected} bytes, got {actual} bytes")]
    InvalidBlockLength {
        expected: usize,
        actual: usize,
    },

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),
}

