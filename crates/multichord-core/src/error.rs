//! Error types for multichord

use thiserror::Error;

/// Errors raised by the non-real-time surfaces (state restore, program lookup).
/// The event path never fails.
#[derive(Debug, Error, PartialEq)]
pub enum MultiChordError {
    #[error("State was saved with {found} voices, instance has {expected}")]
    VoiceMismatch { expected: usize, found: usize },
    #[error("State holds {found} {kind} values, expected {expected}")]
    ParameterCount { kind: &'static str, expected: usize, found: usize },
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
}

pub type Result<T> = std::result::Result<T, MultiChordError>;
