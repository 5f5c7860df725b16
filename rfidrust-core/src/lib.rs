//! # rfidrust-core
//!
//! Core protocol implementation for MIFARE cards behind PC/SC readers.
//!
//! This crate provides the low-level protocol primitives:
//! - Command frame construction and status stripping
//! - Status word validation
//! - Capacity detection from the ATR
//! - Reader dialects
//! - Protocol constants

pub mod capacity;
pub mod constants;
pub mod dialect;
pub mod error;
pub mod frame;
pub mod key;
pub mod session;
pub mod status;

pub use capacity::Capacity;
pub use dialect::{CommandSet, ReaderFamily};
pub use error::{Error, Result};
pub use frame::CommandFrame;
pub use key::MifareKey;
pub use session::{Session, SessionState};
pub use status::StatusWord;
