//! Error types for texstore-common.

use thiserror::Error;

/// Error raised by a [`ByteSource`](crate::ByteSource).
#[derive(Debug, Error)]
pub enum Error {
    /// The source ran out before a read could be satisfied.
    #[error("unexpected end of input: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
