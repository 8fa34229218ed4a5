use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes for machine-readable output.
pub mod codes {
    pub const PREPARE_ROOT_INVALID: &str = "PREPARE_ROOT_INVALID";
    pub const PREPARE_CONFIG_INVALID: &str = "PREPARE_CONFIG_INVALID";
    pub const PREPARE_WRITE_FAILED: &str = "PREPARE_WRITE_FAILED";
    pub const PREPARE_HOOK_FAILED: &str = "PREPARE_HOOK_FAILED";
    pub const PREPARE_IO_ERROR: &str = "PREPARE_IO_ERROR";
    pub const PREPARE_ERROR: &str = "PREPARE_ERROR";
}

/// Core error type for typeprep operations.
///
/// Per-identifier lookup problems are never errors; they end up as
/// [`crate::Resolution`] reason codes instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid project root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Failed to write declarations to {path}: {source}")]
    Emit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("prepare:types hook failed: {0}")]
    Hook(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    #[must_use]
    pub fn hook(msg: impl Into<String>) -> Self {
        Self::Hook(msg.into())
    }

    /// Stable code for this error (see [`codes`]).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => codes::PREPARE_IO_ERROR,
            Self::ConfigRead { .. } | Self::ConfigParse { .. } => codes::PREPARE_CONFIG_INVALID,
            Self::InvalidRoot { .. } => codes::PREPARE_ROOT_INVALID,
            Self::Emit { .. } => codes::PREPARE_WRITE_FAILED,
            Self::Hook(_) => codes::PREPARE_HOOK_FAILED,
            Self::Other(_) => codes::PREPARE_ERROR,
        }
    }
}
