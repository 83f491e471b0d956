//! Error types for the emission subsystem.
//!
//! The admission predicate itself is a total function and never fails;
//! errors here cover configuration validation and port glue only.

use thiserror::Error;

/// Result type alias for emitter operations
pub type Result<T> = std::result::Result<T, EmitterError>;

/// Errors that can occur around the emission decision path
#[derive(Debug, Error)]
pub enum EmitterError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A piecewise function table violates monotonicity
    #[error("Invalid piecewise function: {0}")]
    InvalidPieceFunc(String),

    /// Candidate construction failed upstream
    #[error("Candidate source error: {0}")]
    CandidateSource(String),

    /// Broadcast of an admitted event failed
    #[error("Event sink error: {0}")]
    EventSink(String),
}
