//! Raw notification records and the semantic events decoded from them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::mask::EventKind;

/// One entry of an OS notification batch.
///
/// `name` is relative to the directory the notification scope is anchored
/// at. `kind` is `None` for action codes the watcher does not map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub kind: Option<EventKind>,
    pub name: PathBuf,
}

impl RawRecord {
    #[must_use]
    pub fn new(kind: EventKind, name: impl Into<PathBuf>) -> Self {
        Self {
            kind: Some(kind),
            name: name.into(),
        }
    }

    /// A record carrying an action code with no semantic meaning.
    #[must_use]
    pub fn unrecognized(name: impl Into<PathBuf>) -> Self {
        Self {
            kind: None,
            name: name.into(),
        }
    }
}

/// Kind of a surfaced change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    /// Map a raw kind to a change kind; rename halves have none.
    #[must_use]
    pub fn from_event_kind(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Added => Some(Self::Added),
            EventKind::Removed => Some(Self::Removed),
            EventKind::Modified => Some(Self::Modified),
            EventKind::RenamedOld | EventKind::RenamedNew => None,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        };
        f.write_str(name)
    }
}

/// Event surfaced to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A path was added, removed or modified.
    Change { path: PathBuf, kind: ChangeKind },
    /// A path was renamed.
    Rename { old_path: PathBuf, new_path: PathBuf },
}

impl Event {
    #[must_use]
    pub fn change(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self::Change {
            path: path.into(),
            kind,
        }
    }

    #[must_use]
    pub fn rename(old_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Self {
        Self::Rename {
            old_path: old_path.into(),
            new_path: new_path.into(),
        }
    }
}
