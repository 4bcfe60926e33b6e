//! Watcher error types.

use std::fmt;
use std::path::{Path, PathBuf};

/// Category of a terminal worker error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No handle could be acquired on the watched path.
    Open,
    /// The change-notification request could not be issued.
    Read,
    /// A request was issued but its result could not be retrieved.
    Completion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Read => "read",
            Self::Completion => "completion",
        };
        f.write_str(name)
    }
}

/// Errors that terminate a watch worker.
///
/// Every variant carries the path of the watched object so the consumer
/// can tell which worker failed, plus the OS error text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// The watched path could not be opened.
    #[error("Monitor of '{}': unable to open object: {message}", path.display())]
    Open { path: PathBuf, message: String },

    /// The notification request could not be issued.
    #[error("Monitor of '{}': unable to read changes: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// The notification result could not be retrieved.
    #[error("Monitor of '{}': unable to complete notification: {message}", path.display())]
    Completion { path: PathBuf, message: String },
}

impl WatchError {
    pub fn open(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Open {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn read(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Read {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn completion(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Completion {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. } => ErrorKind::Open,
            Self::Read { .. } => ErrorKind::Read,
            Self::Completion { .. } => ErrorKind::Completion,
        }
    }

    /// Path of the watched object the error belongs to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::Completion { path, .. } => {
                path
            }
        }
    }

    /// The OS error text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Open { message, .. }
            | Self::Read { message, .. }
            | Self::Completion { message, .. } => message,
        }
    }
}
