//! Event decoder and rename correlator.
//!
//! Turns raw records into semantic [`Event`]s, one record at a time, and
//! merges the two halves of an OS rename notification into one
//! [`Event::Rename`]. A pending rename expires as soon as any record other
//! than its `RenamedNew` half arrives.

use std::path::PathBuf;

use super::event::{ChangeKind, Event, RawRecord};
use super::filter;
use super::mask::EventKind;
use super::object::WatchedObject;

/// Per-worker decoding state.
#[derive(Debug)]
pub struct Decoder {
    object: WatchedObject,
    pending_old: Option<PathBuf>,
}

impl Decoder {
    #[must_use]
    pub fn new(object: WatchedObject) -> Self {
        Self {
            object,
            pending_old: None,
        }
    }

    /// The watched object, with its path as last reported.
    #[must_use]
    pub fn object(&self) -> &WatchedObject {
        &self.object
    }

    /// Old path of the rename waiting for its second half, if any.
    #[must_use]
    pub fn pending_rename(&self) -> Option<&PathBuf> {
        self.pending_old.as_ref()
    }

    /// Decode every record of a batch, in order.
    pub fn decode_batch<'a>(
        &'a mut self,
        records: impl IntoIterator<Item = &'a RawRecord> + 'a,
    ) -> impl Iterator<Item = Event> + 'a {
        records.into_iter().filter_map(move |r| self.decode(r))
    }

    /// Decode one record into zero or one event.
    pub fn decode(&mut self, record: &RawRecord) -> Option<Event> {
        let Some(kind) = record.kind else {
            tracing::trace!(name = %record.name.display(), "Unrecognized action, ignoring");
            return None;
        };

        if kind != EventKind::RenamedNew {
            self.expire_pending(record);
        }

        if !filter::is_relevant(&self.object, record, self.pending_old.is_some()) {
            tracing::trace!(name = %record.name.display(), ?kind, "Record not relevant");
            return None;
        }

        match kind {
            EventKind::RenamedOld => {
                self.pending_old = Some(self.resolve(record));
                None
            }
            EventKind::RenamedNew => self.complete_rename(record),
            EventKind::Added | EventKind::Removed | EventKind::Modified => {
                if !filter::is_wanted(&self.object, kind) {
                    return None;
                }
                let change = ChangeKind::from_event_kind(kind)?;
                Some(Event::change(self.resolve(record), change))
            }
        }
    }

    fn complete_rename(&mut self, record: &RawRecord) -> Option<Event> {
        let Some(old_path) = self.pending_old.take() else {
            tracing::trace!(name = %record.name.display(), "Rename target without source, ignoring");
            return None;
        };

        let new_path = if self.object.is_directory() {
            self.object.path().join(&record.name)
        } else {
            let renamed = self.object.watch_root().join(&record.name);
            tracing::debug!(
                from = %self.object.path().display(),
                to = %renamed.display(),
                "Watched file renamed"
            );
            self.object.set_path(renamed.clone());
            renamed
        };

        filter::is_wanted(&self.object, EventKind::RenamedNew)
            .then(|| Event::rename(old_path, new_path))
    }

    fn expire_pending(&mut self, record: &RawRecord) {
        if let Some(old_path) = self.pending_old.take() {
            tracing::debug!(
                old = %old_path.display(),
                interrupted_by = %record.name.display(),
                "Pending rename expired"
            );
        }
    }

    /// Full path a record refers to.
    fn resolve(&self, record: &RawRecord) -> PathBuf {
        if self.object.is_directory() {
            self.object.path().join(&record.name)
        } else {
            self.object.path().to_path_buf()
        }
    }
}
