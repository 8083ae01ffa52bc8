//! Error types for cbrng

use thiserror::Error;

/// Result type alias using cbrng's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving a counter-based engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The engine's counter has produced its full output sequence.
    ///
    /// Every draw after the last word of the last counter block reports this
    /// error until the engine is re-seeded. An exhausted engine holds the
    /// canonical state (counter zero, result index at the block length), so
    /// all exhausted engines of one type compare equal and serialize
    /// identically.
    #[error("engine output sequence exhausted; reseed to continue")]
    Exhausted,

    /// A `discard` jump would step the counter past its wrap point
    #[error("discarding {jump} outputs would overflow the counter")]
    DiscardOverflow {
        /// The requested jump, in output words
        jump: u64,
    },

    /// Deserialized engine state was missing words or not parseable
    #[error("malformed engine state: {reason}")]
    InvalidState {
        /// What the parser rejected
        reason: &'static str,
    },
}
