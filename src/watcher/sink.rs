//! Event sinks: how decoded events leave a worker.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use super::error::WatchError;
use super::event::Event;
use super::object::WatchId;

/// Receiver of one worker's output.
///
/// Called only from the worker's own task, in batch order. Implementations
/// must not block for long: a slow sink stalls its worker.
pub trait EventSink: Send + 'static {
    fn on_event(&mut self, event: Event);

    fn on_error(&mut self, error: WatchError);
}

/// Payload of a [`WatchMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum WatchPayload {
    Event(Event),
    #[serde(serialize_with = "serialize_error")]
    Error(WatchError),
}

fn serialize_error<S: serde::Serializer>(error: &WatchError, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct ErrorView<'a> {
        kind: super::error::ErrorKind,
        path: &'a std::path::Path,
        message: &'a str,
    }

    ErrorView {
        kind: error.kind(),
        path: error.path(),
        message: error.message(),
    }
    .serialize(serializer)
}

/// One worker output, tagged with the object it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchMessage {
    pub id: WatchId,
    pub at: DateTime<Utc>,
    pub payload: WatchPayload,
}

/// Sink forwarding everything into a channel shared by many workers.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    id: WatchId,
    tx: mpsc::UnboundedSender<WatchMessage>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(id: WatchId, tx: mpsc::UnboundedSender<WatchMessage>) -> Self {
        Self { id, tx }
    }

    fn send(&self, payload: WatchPayload) {
        let message = WatchMessage {
            id: self.id,
            at: Utc::now(),
            payload,
        };
        if self.tx.send(message).is_err() {
            tracing::debug!(id = %self.id, "Aggregator gone, dropping message");
        }
    }
}

impl EventSink for ChannelSink {
    fn on_event(&mut self, event: Event) {
        self.send(WatchPayload::Event(event));
    }

    fn on_error(&mut self, error: WatchError) {
        self.send(WatchPayload::Error(error));
    }
}
