//! Centralized error types for postbridge.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the postbridge library.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The input could not be parsed as exactly one email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The charset label given as a rendering hint is not recognized.
    #[error("Unknown charset label: {0}")]
    UnknownCharset(String),

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is malformed.
    #[error("Invalid config file '{path}': {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// A translation catalog could not be parsed.
    #[error("Invalid translation catalog: {0}")]
    CatalogParse(String),
}

/// Convenience alias for `Result<T, BridgeError>`.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `InvalidAddress` variant, quoting the offending input.
    pub fn invalid_address(raw: &str) -> Self {
        Self::InvalidAddress(format!("'{}'", raw.trim()))
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `BridgeError`
/// when no path context is available (rare — prefer `BridgeError::io`).
impl From<std::io::Error> for BridgeError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
