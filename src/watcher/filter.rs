//! Interest filter: decides whether a raw record concerns a watched object.

use std::ffi::OsStr;

use super::event::RawRecord;
use super::mask::EventKind;
use super::object::WatchedObject;

/// Case-insensitive, locale-agnostic name comparison.
///
/// Names that are not valid Unicode are compared exactly.
#[must_use]
pub fn names_match(a: &OsStr, b: &OsStr) -> bool {
    match (a.to_str(), b.to_str()) {
        (Some(a), Some(b)) => a
            .chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase)),
        _ => a == b,
    }
}

/// Whether `record` is relevant to `object`.
///
/// Directory watches accept everything the OS scope delivered. File watches
/// accept records naming the watched file, and while a rename is pending
/// also the `RenamedNew` half, whose name by definition differs.
#[must_use]
pub fn is_relevant(object: &WatchedObject, record: &RawRecord, rename_pending: bool) -> bool {
    if object.is_directory() {
        return true;
    }

    if rename_pending && record.kind == Some(EventKind::RenamedNew) {
        return true;
    }

    object
        .file_name()
        .is_some_and(|name| names_match(name, record.name.as_os_str()))
}

/// Whether the object's interest mask selects `kind`.
#[must_use]
pub fn is_wanted(object: &WatchedObject, kind: EventKind) -> bool {
    object.mask().contains(kind)
}
