//! Raw notification sources.
//!
//! A source yields FIFO batches of [`RawRecord`]s for one watched object.
//! [`NotifySource`] is backed by the OS through `notify`; [`ManualSource`]
//! is fed by hand and replays whatever batches it is given.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use notify::event::{ModifyKind, RenameMode};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;
use super::event::RawRecord;
use super::mask::EventKind;
use super::object::WatchedObject;

/// A stream of raw notification batches for one watched object.
#[async_trait]
pub trait NotificationSource: Send {
    /// Wait for the next batch of records.
    ///
    /// Must be cancel safe: dropping the returned future loses no records.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Completion` if the batch could not be retrieved.
    async fn next_batch(&mut self) -> Result<Vec<RawRecord>, WatchError>;

    /// Release the outstanding OS request. Called once, before the worker exits.
    fn cancel(&mut self);
}

/// Map a notify event kind to a raw event kind.
///
/// `Name(Both)` repeats the two halves already reported separately and
/// `Name(Any)` carries no direction, so neither maps to anything.
#[must_use]
pub fn raw_kind(kind: &notify::EventKind) -> Option<EventKind> {
    use notify::EventKind as Notify;

    match kind {
        Notify::Create(_) => Some(EventKind::Added),
        Notify::Remove(_) => Some(EventKind::Removed),
        Notify::Modify(ModifyKind::Name(RenameMode::From)) => Some(EventKind::RenamedOld),
        Notify::Modify(ModifyKind::Name(RenameMode::To)) => Some(EventKind::RenamedNew),
        Notify::Modify(ModifyKind::Name(_)) => None,
        Notify::Modify(_) => Some(EventKind::Modified),
        Notify::Access(_) | Notify::Any | Notify::Other => None,
    }
}

/// Anchor of an OS watch, mapping reported paths back to relative names.
///
/// Backends may report paths through the canonical form of the root (e.g.
/// `/private/var` for `/var` on macOS), so both spellings are stripped.
#[derive(Debug, Clone)]
struct WatchRoot {
    path: PathBuf,
    canonical: Option<PathBuf>,
}

impl WatchRoot {
    fn new(path: PathBuf) -> Self {
        let canonical = std::fs::canonicalize(&path).ok().filter(|c| *c != path);
        Self { path, canonical }
    }

    /// Name of `path` relative to the root. `None` for the root itself and
    /// for paths outside it.
    fn relative_name(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(&self.path).ok().or_else(|| {
            self.canonical
                .as_deref()
                .and_then(|root| path.strip_prefix(root).ok())
        })?;
        (!relative.as_os_str().is_empty()).then(|| relative.to_path_buf())
    }

    fn push_records(&self, batch: &mut Vec<RawRecord>, event: &notify::Event) {
        let kind = raw_kind(&event.kind);
        for path in &event.paths {
            let Some(name) = self.relative_name(path) else {
                tracing::trace!(path = %path.display(), "Path is the watch root or outside it, ignoring");
                continue;
            };
            batch.push(RawRecord { kind, name });
        }
    }
}

type NotifyReceiver = mpsc::UnboundedReceiver<notify::Result<notify::Event>>;

/// Source backed by the platform's recommended `notify` watcher.
pub struct NotifySource {
    object_path: PathBuf,
    root: WatchRoot,
    watcher: Option<RecommendedWatcher>,
    rx: NotifyReceiver,
    held_error: Option<notify::Error>,
}

impl NotifySource {
    /// Open a watch on the directory containing `object`.
    ///
    /// File watches observe the parent directory non-recursively; directory
    /// watches observe the directory itself, recursively if requested. The
    /// watched path itself stays free to be modified, replaced or renamed.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Open` if the path is missing, unreadable or no
    /// longer of the expected type, and `WatchError::Read` if the OS refused
    /// the watch request.
    pub fn open(object: &WatchedObject) -> Result<Self, WatchError> {
        let object_path = object.path().to_path_buf();
        let metadata =
            std::fs::metadata(&object_path).map_err(|e| WatchError::open(&object_path, e))?;
        if metadata.is_dir() != object.is_directory() {
            let expected = if object.is_directory() {
                "directory"
            } else {
                "file"
            };
            return Err(WatchError::open(
                &object_path,
                format!("path is no longer a {expected}"),
            ));
        }

        // Backends report absolute paths even for a relative watch.
        let root = std::path::absolute(object.watch_root())
            .map_err(|e| WatchError::open(&object_path, e))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                let _ = tx.send(result);
            })
            .map_err(|e| WatchError::open(&object_path, e))?;

        let mode = if object.recursive() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&root, mode)
            .map_err(|e| WatchError::read(&object_path, e))?;

        tracing::debug!(root = %root.display(), ?mode, "OS watch registered");

        Ok(Self::with_receiver(object_path, root, Some(watcher), rx))
    }

    fn with_receiver(
        object_path: PathBuf,
        root: PathBuf,
        watcher: Option<RecommendedWatcher>,
        rx: NotifyReceiver,
    ) -> Self {
        Self {
            object_path,
            root: WatchRoot::new(root),
            watcher,
            rx,
            held_error: None,
        }
    }

    fn completion_error(&self, error: &notify::Error) -> WatchError {
        WatchError::completion(&self.object_path, error)
    }
}

#[async_trait]
impl NotificationSource for NotifySource {
    async fn next_batch(&mut self) -> Result<Vec<RawRecord>, WatchError> {
        if let Some(error) = self.held_error.take() {
            return Err(self.completion_error(&error));
        }

        let first = self.rx.recv().await.ok_or_else(|| {
            WatchError::completion(&self.object_path, "notification channel closed")
        })?;

        let mut batch = Vec::new();
        match first {
            Ok(event) => self.root.push_records(&mut batch, &event),
            Err(error) => return Err(self.completion_error(&error)),
        }

        // Drain whatever the OS already queued behind the first event.
        while let Ok(next) = self.rx.try_recv() {
            match next {
                Ok(event) => self.root.push_records(&mut batch, &event),
                Err(error) => {
                    self.held_error = Some(error);
                    break;
                }
            }
        }

        Ok(batch)
    }

    fn cancel(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.root.path) {
                tracing::debug!(root = %self.root.path.display(), error = %e, "Unwatch failed");
            }
        }
    }
}

impl Drop for NotifySource {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Source fed by hand through a [`ManualSourceHandle`].
///
/// Waits forever once the handle is dropped, like an OS watch on a path
/// that never changes.
pub struct ManualSource {
    rx: mpsc::UnboundedReceiver<Result<Vec<RawRecord>, WatchError>>,
    released: Arc<AtomicBool>,
}

/// Feeding side of a [`ManualSource`].
#[derive(Debug, Clone)]
pub struct ManualSourceHandle {
    tx: mpsc::UnboundedSender<Result<Vec<RawRecord>, WatchError>>,
    released: Arc<AtomicBool>,
}

impl ManualSource {
    #[must_use]
    pub fn new() -> (Self, ManualSourceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let released = Arc::new(AtomicBool::new(false));
        (
            Self {
                rx,
                released: Arc::clone(&released),
            },
            ManualSourceHandle { tx, released },
        )
    }
}

impl ManualSourceHandle {
    /// Deliver a batch. Returns `false` once the source is gone.
    pub fn push(&self, batch: Vec<RawRecord>) -> bool {
        self.tx.send(Ok(batch)).is_ok()
    }

    /// Make the next wait fail with `error`. Returns `false` once the source is gone.
    pub fn fail(&self, error: WatchError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// Whether the worker released the source.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

#[async_trait]
impl NotificationSource for ManualSource {
    async fn next_batch(&mut self) -> Result<Vec<RawRecord>, WatchError> {
        match self.rx.recv().await {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    fn cancel(&mut self) {
        self.rx.close();
        self.released.store(true, Ordering::Release);
    }
}
