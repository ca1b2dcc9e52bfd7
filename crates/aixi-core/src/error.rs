//! Error types.
//!
//! Configuration problems are the only recoverable-by-the-user failures the
//! core has: they are reported on stderr and the process exits non-zero.
//! Contract violations between the agent's components (wrong update order,
//! oversized decode widths, invalid actions) are programming bugs and are
//! asserted, not propagated.

use thiserror::Error;

/// Result alias for driver-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while resolving configuration options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required option '{0}' is missing")]
    MissingOption(String),

    #[error("option '{key}' has invalid value '{value}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),

    #[error("unknown maze observation encoding '{0}'")]
    UnknownMazeEncoding(String),

    #[error("maze has no square the agent can teleport to")]
    MazeWithoutTeleport,

    #[error("maze row {row} should have {expected} columns, found {found}")]
    MazeRowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Error {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
