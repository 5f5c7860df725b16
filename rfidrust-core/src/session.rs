//! Card session state
//!
//! A session represents one card in the field of one reader and tracks:
//! - Lifecycle state (closed or active)
//! - Reader dialect selected for the card
//! - Capacity resolved from the ATR, cached until the session closes

use crate::{
    capacity::Capacity,
    dialect::ReaderFamily,
    error::{Error, Result},
};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No channel held
    Closed,

    /// Card present and channel held
    Active,
}

/// Per-card session record
///
/// Owned by exactly one card session; not shared between threads.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    family: ReaderFamily,
    capacity: Capacity,
}

impl Session {
    /// Create a new closed session
    pub fn new() -> Self {
        Self {
            state: SessionState::Closed,
            family: ReaderFamily::default(),
            capacity: Capacity::Unsupported,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if active
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    /// Dialect in use
    pub fn family(&self) -> ReaderFamily {
        self.family
    }

    /// Cached capacity, `Unsupported` while closed
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Mark the session active for a card spoken to in `family`'s dialect
    pub fn activate(&mut self, family: ReaderFamily, capacity: Capacity) -> Result<()> {
        if self.state != SessionState::Closed {
            return Err(Error::InvalidSessionState(format!(
                "Cannot activate from state: {:?}",
                self.state
            )));
        }

        self.family = family;
        self.capacity = capacity;
        self.state = SessionState::Active;

        Ok(())
    }

    /// Close session and discard everything cached for the card
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.family = ReaderFamily::default();
        self.capacity = Capacity::Unsupported;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
