//! Error taxonomy for a purge run
//!
//! `PurgeError` covers what can abort a category or the whole run.
//! `DeleteError` covers what a single remote call can report; those are
//! always recovered per attempt and never abort anything.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type PurgeResult<T> = Result<T, PurgeError>;

#[derive(Error, Debug, Clone)]
pub enum PurgeError {
    #[error("Malformed export {}: {reason}", .path.display())]
    MalformedExport { path: PathBuf, reason: String },

    #[error("Configuration error in '{field}': {message}")]
    Configuration { field: String, message: String },

    #[error("Remote client setup failed: {message}")]
    ClientSetup { message: String },
}

impl PurgeError {
    pub fn malformed_export(path: &Path, reason: impl Into<String>) -> Self {
        Self::MalformedExport {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn configuration(field: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn client_setup(message: impl Into<String>) -> Self {
        Self::ClientSetup {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Failure reported by the remote API itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("VK API error {code}: {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

impl ApiError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Outcome of a failed delete call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Transport, decoding or logic failure; `kind` names the failure class.
    #[error("{kind}: {message}")]
    Other { kind: String, message: String },
}

impl DeleteError {
    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
