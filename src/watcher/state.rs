//! Worker lifecycle state machine.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Lifecycle of a watch worker.
///
/// `Created -> Running -> Stopping -> Stopped`, with `Created -> Stopping`
/// for a worker that fails before its loop starts. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    #[default]
    Created,
    Running,
    Stopping,
    Stopped,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Running => 1,
            Self::Stopping => 2,
            Self::Stopped => 3,
        }
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Running)
                | (Self::Created | Self::Running, Self::Stopping)
                | (Self::Stopping, Self::Stopped)
        )
    }
}

/// Lifecycle state shared between a worker and its handle.
#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<AtomicU8>);

impl SharedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `next`. Illegal transitions are ignored and return `false`.
    pub fn transition(&self, next: WorkerState) -> bool {
        let current = self.get();
        if !current.can_transition(next) {
            tracing::warn!(from = ?current, to = ?next, "Illegal worker state transition");
            return false;
        }
        tracing::debug!(from = ?current, to = ?next, "State transition");
        self.0.store(next.as_u8(), Ordering::Release);
        true
    }
}
