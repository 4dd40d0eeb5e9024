//! Error taxonomy for the oracle engine.
//!
//! Buffer underflow in the quantum source is not an error: it is recovered by
//! a transparent refill. A failed refill inside `draw` terminates the process;
//! everything else surfaces here.

use thiserror::Error;

/// Errors surfaced by oracle, digest and configuration operations.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle value needs more bytes than the requested fixed width.
    #[error("value needs {required} bytes but the fixed width is {width}")]
    Overflow { required: usize, width: usize },

    /// A digest or source parameter is outside the supported range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The remote randomness service failed or returned malformed data.
    #[error("randomness source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OracleError>;
