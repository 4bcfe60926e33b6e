//! Per-object bookkeeping.

use serde::Serialize;

use crate::watcher::{ChangeKind, Event};

/// Label of the last event an object saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LastEvent {
    Added,
    Removed,
    Modified,
    Renamed,
}

impl From<&Event> for LastEvent {
    fn from(event: &Event) -> Self {
        match event {
            Event::Change { kind, .. } => match kind {
                ChangeKind::Added => Self::Added,
                ChangeKind::Removed => Self::Removed,
                ChangeKind::Modified => Self::Modified,
            },
            Event::Rename { .. } => Self::Renamed,
        }
    }
}

/// Running status of a watched object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectStatus {
    /// Events seen since the object was added or last reset.
    pub events: u64,
    pub last_event: Option<LastEvent>,
    /// Error that stopped the worker, if any.
    pub failure: Option<String>,
}

impl ObjectStatus {
    pub fn record(&mut self, event: &Event) {
        self.events = self.events.saturating_add(1);
        self.last_event = Some(event.into());
    }

    pub fn reset(&mut self) {
        self.events = 0;
        self.last_event = None;
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}
