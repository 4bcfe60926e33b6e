//! Manager for the workers of all watched objects.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::watcher::{
    self, ChannelSink, Event, EventMask, NotificationSource, WatchId, WatchMessage, WatchPayload,
    WatchedObject, WorkerHandle, WorkerState,
};

use super::ObjectStatus;

/// Error type for manager operations.
#[derive(thiserror::Error, Debug)]
pub enum ManagerError {
    /// No object with this id is being watched.
    #[error("Watched object not found: {id}")]
    ObjectNotFound { id: WatchId },

    /// The path to watch could not be inspected.
    #[error("Cannot watch {path}: {source}")]
    InvalidObject {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A watched object together with its worker and status.
#[derive(Debug)]
pub struct ManagedObject {
    object: WatchedObject,
    status: ObjectStatus,
    handle: WorkerHandle,
}

impl ManagedObject {
    /// The object, with its path as last reported by its worker.
    #[must_use]
    pub fn object(&self) -> &WatchedObject {
        &self.object
    }

    #[must_use]
    pub fn status(&self) -> &ObjectStatus {
        &self.status
    }

    #[must_use]
    pub fn worker_state(&self) -> WorkerState {
        self.handle.state()
    }

    fn apply(&mut self, payload: &WatchPayload) {
        match payload {
            WatchPayload::Event(event) => {
                self.status.record(event);
                if let Event::Rename { old_path, new_path } = event {
                    if !self.object.is_directory() && self.object.path() == old_path {
                        tracing::info!(
                            from = %old_path.display(),
                            to = %new_path.display(),
                            "Watched object renamed"
                        );
                        self.object.set_path(new_path.clone());
                    }
                }
            }
            WatchPayload::Error(error) => {
                self.status.failure = Some(error.to_string());
            }
        }
    }
}

/// Runs one worker per watched object and aggregates their output.
///
/// All workers feed a single channel; [`WatchManager::next_message`] drains
/// it and keeps per-object status up to date.
#[derive(Debug)]
pub struct WatchManager {
    objects: Vec<ManagedObject>,
    tx: mpsc::UnboundedSender<WatchMessage>,
    rx: mpsc::UnboundedReceiver<WatchMessage>,
}

impl WatchManager {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            objects: Vec::new(),
            tx,
            rx,
        }
    }

    /// Start watching `object` with the OS notification backend.
    ///
    /// Open failures arrive later as an error message for the returned id.
    pub fn add(&mut self, object: WatchedObject) -> WatchId {
        let sink = ChannelSink::new(object.id(), self.tx.clone());
        let handle = watcher::start(object.clone(), sink);
        self.register(object, handle)
    }

    /// Describe the object at `path` and start watching it.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::InvalidObject` if the path cannot be inspected.
    pub fn add_path(
        &mut self,
        path: impl AsRef<Path>,
        recursive: bool,
        mask: EventMask,
    ) -> Result<WatchId, ManagerError> {
        let path = path.as_ref();
        let object = WatchedObject::from_path(path, recursive, mask).map_err(|source| {
            ManagerError::InvalidObject {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(self.add(object))
    }

    /// Start watching `object` with a caller-provided source.
    pub fn add_with_source<N>(&mut self, object: WatchedObject, source: N) -> WatchId
    where
        N: NotificationSource + 'static,
    {
        let sink = ChannelSink::new(object.id(), self.tx.clone());
        let handle = watcher::start_with_source(object.clone(), source, sink);
        self.register(object, handle)
    }

    fn register(&mut self, object: WatchedObject, handle: WorkerHandle) -> WatchId {
        let id = object.id();
        tracing::info!(%id, path = %object.path().display(), "Object added");
        self.objects.push(ManagedObject {
            object,
            status: ObjectStatus::default(),
            handle,
        });
        id
    }

    /// Stop watching an object: abort its worker, then discard it.
    ///
    /// Messages the worker queued before stopping are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::ObjectNotFound` if the id is unknown.
    pub fn remove(&mut self, id: WatchId) -> Result<WatchedObject, ManagerError> {
        let index = self
            .objects
            .iter()
            .position(|m| m.object.id() == id)
            .ok_or(ManagerError::ObjectNotFound { id })?;
        let managed = self.objects.remove(index);
        managed.handle.abort();
        tracing::info!(%id, path = %managed.object.path().display(), "Object removed");
        Ok(managed.object)
    }

    #[must_use]
    pub fn get(&self, id: WatchId) -> Option<&ManagedObject> {
        self.objects.iter().find(|m| m.object.id() == id)
    }

    #[must_use]
    pub fn status(&self, id: WatchId) -> Option<&ObjectStatus> {
        self.get(id).map(ManagedObject::status)
    }

    /// All managed objects, in the order they were added.
    pub fn objects(&self) -> impl Iterator<Item = &ManagedObject> {
        self.objects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Reset the event counter of an object.
    ///
    /// # Errors
    ///
    /// Returns `ManagerError::ObjectNotFound` if the id is unknown.
    pub fn reset_count(&mut self, id: WatchId) -> Result<(), ManagerError> {
        let managed = self
            .objects
            .iter_mut()
            .find(|m| m.object.id() == id)
            .ok_or(ManagerError::ObjectNotFound { id })?;
        managed.status.reset();
        Ok(())
    }

    /// Wait for the next message from any worker and update bookkeeping.
    ///
    /// Returns `None` only if the channel closed, which cannot happen while
    /// the manager is alive.
    pub async fn next_message(&mut self) -> Option<WatchMessage> {
        loop {
            let message = self.rx.recv().await?;
            match self.objects.iter_mut().find(|m| m.object.id() == message.id) {
                Some(managed) => {
                    managed.apply(&message.payload);
                    return Some(message);
                }
                None => {
                    tracing::debug!(id = %message.id, "Dropping message from removed object");
                }
            }
        }
    }

    /// Abort every worker and wait for all of them to exit.
    pub async fn shutdown(self) {
        for managed in &self.objects {
            managed.handle.abort();
        }
        for managed in self.objects {
            let path = managed.object.path().display().to_string();
            if let Err(e) = managed.handle.join().await {
                tracing::warn!(%path, error = %e, "Worker task failed during shutdown");
            }
        }
        tracing::info!("All workers stopped");
    }
}

impl Default for WatchManager {
    fn default() -> Self {
        Self::new()
    }
}
