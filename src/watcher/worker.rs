//! Watch worker: one run loop per watched object.
//!
//! The loop waits on exactly two things, the next notification batch and
//! cancellation, with no timeout. Batches are decoded strictly in arrival
//! order and forwarded to the worker's sink.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::decoder::Decoder;
use super::error::WatchError;
use super::event::RawRecord;
use super::object::{WatchId, WatchedObject};
use super::sink::EventSink;
use super::source::{NotificationSource, NotifySource};
use super::state::{SharedState, WorkerState};

/// Start watching `object` with the OS notification backend.
///
/// Never fails directly: open errors are reported through the sink's error
/// channel and the worker then stops.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn start<S: EventSink>(object: WatchedObject, sink: S) -> WorkerHandle {
    spawn(object, sink, NotifySource::open)
}

/// Start watching `object` with an already constructed source.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn start_with_source<N, S>(object: WatchedObject, source: N, sink: S) -> WorkerHandle
where
    N: NotificationSource + 'static,
    S: EventSink,
{
    spawn(object, sink, move |_| Ok(source))
}

fn spawn<N, S, F>(object: WatchedObject, sink: S, open: F) -> WorkerHandle
where
    N: NotificationSource + 'static,
    S: EventSink,
    F: FnOnce(&WatchedObject) -> Result<N, WatchError> + Send + 'static,
{
    let id = object.id();
    let cancel = CancellationToken::new();
    let state = SharedState::new();

    let task = {
        let cancel = cancel.clone();
        let state = state.clone();
        tokio::spawn(async move {
            let mut sink = sink;
            match open(&object) {
                Ok(source) => {
                    let worker = WatchWorker {
                        decoder: Decoder::new(object),
                        source,
                        sink,
                        cancel,
                        state,
                    };
                    worker.run().await;
                }
                Err(error) => {
                    tracing::warn!(path = %object.path().display(), %error, "Failed to open watched object");
                    sink.on_error(error);
                    cancel.cancel();
                    state.transition(WorkerState::Stopping);
                    state.transition(WorkerState::Stopped);
                }
            }
        })
    };

    WorkerHandle {
        id,
        cancel,
        state,
        task: Some(task),
    }
}

struct WatchWorker<N, S> {
    decoder: Decoder,
    source: N,
    sink: S,
    cancel: CancellationToken,
    state: SharedState,
}

impl<N: NotificationSource, S: EventSink> WatchWorker<N, S> {
    async fn run(mut self) {
        self.state.transition(WorkerState::Running);
        let object = self.decoder.object();
        tracing::info!(
            id = %object.id(),
            path = %object.path().display(),
            directory = object.is_directory(),
            recursive = object.recursive(),
            events = %object.mask(),
            "Watch worker started"
        );

        let failure = loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => break None,
                batch = self.source.next_batch() => match batch {
                    Ok(records) => {
                        tracing::debug!(records = records.len(), "Notification batch");
                        self.dispatch(&records);
                    }
                    Err(error) => break Some(error),
                },
            }
        };

        if let Some(error) = failure {
            tracing::warn!(path = %self.decoder.object().path().display(), %error, "Watch worker failed");
            self.sink.on_error(error);
            self.cancel.cancel();
        }

        self.state.transition(WorkerState::Stopping);
        self.source.cancel();
        self.state.transition(WorkerState::Stopped);
        tracing::info!(path = %self.decoder.object().path().display(), "Watch worker stopped");
    }

    fn dispatch(&mut self, records: &[RawRecord]) {
        for record in records {
            if self.cancel.is_cancelled() {
                return;
            }
            if let Some(event) = self.decoder.decode(record) {
                self.sink.on_event(event);
            }
        }
    }
}

/// Control handle of a running worker.
///
/// Dropping the handle aborts the worker.
#[derive(Debug)]
pub struct WorkerHandle {
    id: WatchId,
    cancel: CancellationToken,
    state: SharedState,
    task: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Id of the watched object.
    #[must_use]
    pub fn id(&self) -> WatchId {
        self.id
    }

    /// Request cancellation. Idempotent and callable from any thread; does
    /// not wait for the loop to exit.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Whether the worker task has fully exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker task to exit.
    ///
    /// # Errors
    ///
    /// Returns the join error if the worker task panicked.
    pub async fn join(mut self) -> Result<(), tokio::task::JoinError> {
        match self.task.take() {
            Some(task) => task.await,
            None => Ok(()),
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
