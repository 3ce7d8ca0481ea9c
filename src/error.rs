//! Error types for LR-WPAN frame coding and interference computation

use thiserror::Error;

/// Result type for frame and interference operations
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors raised by the bit-string codecs and the interference engine
///
/// None of these are transient: each one points at malformed input or a
/// caller that broke an ordering precondition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Malformed or undersized binary input
    #[error("Format error: {0}")]
    Format(String),

    /// Value does not fit the width of its target field
    #[error("Range error: {0}")]
    Range(String),

    /// Operation not valid in the current engine state
    #[error("State error: {0}")]
    State(String),
}

impl FrameError {
    /// Create a new Format error
    pub fn format(msg: impl Into<String>) -> Self {
        FrameError::Format(msg.into())
    }

    /// Create a new Range error
    pub fn range(msg: impl Into<String>) -> Self {
        FrameError::Range(msg.into())
    }

    /// Create a new State error
    pub fn state(msg: impl Into<String>) -> Self {
        FrameError::State(msg.into())
    }
}
