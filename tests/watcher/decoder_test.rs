//! Tests for identity filtering, mask filtering and rename correlation.

use std::path::Path;

use filesystem_watcher::watcher::{ChangeKind, Decoder, Event, EventKind, EventMask, RawRecord, WatchedObject};

fn decode_all(decoder: &mut Decoder, records: &[RawRecord]) -> Vec<Event> {
    records.iter().filter_map(|r| decoder.decode(r)).collect()
}

#[test]
fn file_watch_ignores_other_names() {
    let mut decoder = Decoder::new(WatchedObject::new("/a/f.txt", false, false, EventMask::ALL));
    let events = decode_all(&mut decoder, &[RawRecord::new(EventKind::Modified, "g.txt")]);
    assert!(events.is_empty());
}

#[test]
fn file_watch_matches_case_insensitively() {
    let mut decoder = Decoder::new(WatchedObject::new("/a/f.txt", false, false, EventMask::ALL));
    let events = decode_all(&mut decoder, &[RawRecord::new(EventKind::Modified, "F.TXT")]);
    assert_eq!(events, vec![Event::change("/a/f.txt", ChangeKind::Modified)]);
}

#[test]
fn directory_rename_yields_single_event() {
    let mut decoder = Decoder::new(WatchedObject::new("/dir", true, false, EventMask::ALL));
    let events = decode_all(
        &mut decoder,
        &[
            RawRecord::new(EventKind::RenamedOld, "old.txt"),
            RawRecord::new(EventKind::RenamedNew, "new.txt"),
        ],
    );
    assert_eq!(events, vec![Event::rename("/dir/old.txt", "/dir/new.txt")]);
}

#[test]
fn file_self_rename_moves_identity() {
    let mut decoder = Decoder::new(WatchedObject::new("/dir/old.txt", false, false, EventMask::ALL));

    // Before the rename, new.txt is somebody else.
    assert!(decode_all(&mut decoder, &[RawRecord::new(EventKind::Modified, "new.txt")]).is_empty());

    let events = decode_all(
        &mut decoder,
        &[
            RawRecord::new(EventKind::RenamedOld, "old.txt"),
            RawRecord::new(EventKind::RenamedNew, "new.txt"),
            RawRecord::new(EventKind::Modified, "new.txt"),
        ],
    );
    assert_eq!(
        events,
        vec![
            Event::rename("/dir/old.txt", "/dir/new.txt"),
            Event::change("/dir/new.txt", ChangeKind::Modified),
        ]
    );
    assert_eq!(decoder.object().path(), Path::new("/dir/new.txt"));
}

#[test]
fn unrelated_event_during_pending_rename_is_not_misattributed() {
    let mut decoder = Decoder::new(WatchedObject::new("/dir/old.txt", false, false, EventMask::ALL));
    let events = decode_all(
        &mut decoder,
        &[
            RawRecord::new(EventKind::RenamedOld, "old.txt"),
            RawRecord::new(EventKind::Modified, "unrelated.log"),
            RawRecord::new(EventKind::RenamedNew, "new.txt"),
        ],
    );
    assert!(events.is_empty(), "got {events:?}");
    assert_eq!(decoder.object().path(), Path::new("/dir/old.txt"));
    assert!(decoder.pending_rename().is_none());
}

#[test]
fn mask_filters_removed_records() {
    let mut file = Decoder::new(WatchedObject::new("/a/f.txt", false, false, EventMask::ADDED));
    let mut dir = Decoder::new(WatchedObject::new("/a", true, false, EventMask::ADDED));
    assert!(decode_all(&mut file, &[RawRecord::new(EventKind::Removed, "f.txt")]).is_empty());
    assert!(decode_all(&mut dir, &[RawRecord::new(EventKind::Removed, "f.txt")]).is_empty());
}

#[test]
fn batch_is_not_reordered_or_coalesced() {
    let mut decoder = Decoder::new(WatchedObject::new("/dir", true, false, EventMask::ALL));
    let events = decode_all(
        &mut decoder,
        &[
            RawRecord::new(EventKind::Added, "x"),
            RawRecord::new(EventKind::Modified, "x"),
            RawRecord::new(EventKind::Removed, "x"),
        ],
    );
    assert_eq!(
        events,
        vec![
            Event::change("/dir/x", ChangeKind::Added),
            Event::change("/dir/x", ChangeKind::Modified),
            Event::change("/dir/x", ChangeKind::Removed),
        ]
    );
}

#[test]
fn recursive_names_keep_subdirectories() {
    let mut decoder = Decoder::new(WatchedObject::new("/dir", true, true, EventMask::ALL));
    let events = decode_all(&mut decoder, &[RawRecord::new(EventKind::Added, "sub/deep.txt")]);
    assert_eq!(events, vec![Event::change("/dir/sub/deep.txt", ChangeKind::Added)]);
}
