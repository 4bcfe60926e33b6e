//! Watcher module tests.

mod decoder_test;
mod worker_test;

/// Verify all public watcher types are exported from the library.
#[test]
fn test_all_watcher_types_exported() {
    use filesystem_watcher::watcher::{
        ChangeKind, ChannelSink, Decoder, ErrorKind, Event, EventKind, EventMask, Interest,
        ManualSource, RawRecord, WatchError, WatchId, WatchedObject, WorkerState,
    };

    let object = WatchedObject::new("/data", true, false, EventMask::ALL);
    let _ = Decoder::new(object);
    let _ = ManualSource::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let _ = ChannelSink::new(WatchId::new(), tx);

    let _ = RawRecord::new(EventKind::Added, "x");
    let _ = Event::change("/data/x", ChangeKind::Added);
    let _: fn() -> WatchError = || WatchError::open("/data", "denied");
    let _ = ErrorKind::Completion;
    let _ = Interest::Renamed;
    let _ = WorkerState::Created;
}
