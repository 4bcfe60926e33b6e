//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::watcher::{EventMask, WatchedObject};

use super::ConfigError;

/// How events are printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print one JSON object per line instead of colored text.
    pub json: bool,
    /// Do not truncate long paths.
    pub raw: bool,
}

/// One object to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// File or directory path. A leading `~/` expands to the home directory.
    pub path: PathBuf,
    /// Watch subdirectories too. Ignored for files.
    #[serde(default)]
    pub recursive: bool,
    /// Event kinds to report.
    #[serde(default)]
    pub events: EventMask,
}

impl ObjectConfig {
    /// Path with `~/` expanded.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.path)
    }

    /// Build the watched object, probing the filesystem for its type.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidObject` if the path cannot be read.
    pub fn to_object(&self) -> Result<WatchedObject, ConfigError> {
        let path = self.resolved_path();
        WatchedObject::from_path(&path, self.recursive, self.events)
            .map_err(|source| ConfigError::InvalidObject { path, source })
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub output: OutputConfig,
    pub objects: Vec<ObjectConfig>,
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
