//! Error types for the annet toolkit.

use thiserror::Error;

/// The main error type for annet operations.
#[derive(Error, Debug)]
pub enum AnnetError {
    /// A dataset vector does not match the network's input/output size.
    #[error("{role} vector has length {got}, network expects {expected}")]
    ShapeMismatch {
        /// Which vector mismatched ("input" or "ideal").
        role: &'static str,
        /// The length the network expects.
        expected: usize,
        /// The length that was supplied.
        got: usize,
    },

    /// A forward or backward pass was attempted on a network whose
    /// topology has not been finalized.
    #[error("network is not finalized")]
    NotFinalized,

    /// A graph-building operation would leave the network inconsistent.
    #[error("structural invariant violated: {0}")]
    Structure(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Training could not proceed.
    #[error("training error: {0}")]
    Training(String),
}

/// Result type alias for annet operations.
pub type Result<T> = std::result::Result<T, AnnetError>;
