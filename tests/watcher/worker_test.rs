//! Tests for the worker run loop with a scripted source.

use std::time::Duration;

use filesystem_watcher::watcher::{
    start_with_source, ChangeKind, ChannelSink, Event, EventKind, EventMask, ManualSource,
    RawRecord, WatchId, WatchMessage, WatchPayload, WatchedObject, WorkerState,
};
use tokio::sync::mpsc;

async fn recv(rx: &mut mpsc::UnboundedReceiver<WatchMessage>) -> WatchMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("channel closed")
}

fn event_of(message: WatchMessage) -> Event {
    match message.payload {
        WatchPayload::Event(event) => event,
        WatchPayload::Error(error) => panic!("unexpected error: {error}"),
    }
}

#[tokio::test]
async fn abort_twice_is_harmless_and_silences_worker() {
    let object = WatchedObject::new("/dir", true, false, EventMask::ALL);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (source, feed) = ManualSource::new();
    let handle = start_with_source(object.clone(), source, ChannelSink::new(object.id(), tx));

    feed.push(vec![RawRecord::new(EventKind::Added, "a")]);
    assert_eq!(
        event_of(recv(&mut rx).await),
        Event::change("/dir/a", ChangeKind::Added)
    );

    handle.abort();
    handle.abort();
    assert!(handle.is_aborted());
    handle.join().await.unwrap();

    assert!(feed.is_released());
    assert!(!feed.push(vec![RawRecord::new(EventKind::Added, "b")]));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn batch_events_arrive_in_order() {
    let object = WatchedObject::new("/dir", true, false, EventMask::ALL);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (source, feed) = ManualSource::new();
    let _handle = start_with_source(object.clone(), source, ChannelSink::new(object.id(), tx));

    feed.push(vec![
        RawRecord::new(EventKind::Added, "x"),
        RawRecord::new(EventKind::Modified, "x"),
        RawRecord::new(EventKind::Removed, "x"),
    ]);

    let mut kinds = Vec::new();
    for _ in 0..3 {
        match event_of(recv(&mut rx).await) {
            Event::Change { kind, .. } => kinds.push(kind),
            Event::Rename { .. } => panic!("unexpected rename"),
        }
    }
    assert_eq!(
        kinds,
        vec![ChangeKind::Added, ChangeKind::Modified, ChangeKind::Removed]
    );
}

#[tokio::test]
async fn rename_spanning_two_batches_is_correlated() {
    let object = WatchedObject::new("/dir", true, false, EventMask::ALL);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (source, feed) = ManualSource::new();
    let _handle = start_with_source(object.clone(), source, ChannelSink::new(object.id(), tx));

    feed.push(vec![RawRecord::new(EventKind::RenamedOld, "a")]);
    feed.push(vec![RawRecord::new(EventKind::RenamedNew, "b")]);

    assert_eq!(
        event_of(recv(&mut rx).await),
        Event::rename("/dir/a", "/dir/b")
    );
}

#[tokio::test]
async fn workers_are_independent() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let first = WatchedObject::new("/left", true, false, EventMask::ALL);
    let second = WatchedObject::new("/right", true, false, EventMask::ALL);
    let (first_id, second_id): (WatchId, WatchId) = (first.id(), second.id());

    let (first_source, first_feed) = ManualSource::new();
    let (second_source, second_feed) = ManualSource::new();
    let first_handle =
        start_with_source(first.clone(), first_source, ChannelSink::new(first_id, tx.clone()));
    let second_handle =
        start_with_source(second.clone(), second_source, ChannelSink::new(second_id, tx));

    first_feed.push(vec![RawRecord::new(EventKind::Added, "l")]);
    let message = recv(&mut rx).await;
    assert_eq!(message.id, first_id);
    assert_eq!(event_of(message), Event::change("/left/l", ChangeKind::Added));

    first_handle.abort();
    first_handle.join().await.unwrap();

    second_feed.push(vec![RawRecord::new(EventKind::Modified, "r")]);
    let message = recv(&mut rx).await;
    assert_eq!(message.id, second_id);
    assert_eq!(event_of(message), Event::change("/right/r", ChangeKind::Modified));
    assert_eq!(second_handle.state(), WorkerState::Running);
    assert!(!second_feed.is_released());
}

#[tokio::test]
async fn idle_worker_blocks_without_emitting() {
    let object = WatchedObject::new("/quiet", true, false, EventMask::ALL);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (source, _feed) = ManualSource::new();
    let handle = start_with_source(object.clone(), source, ChannelSink::new(object.id(), tx));

    let waited = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(waited.is_err());
    assert_eq!(handle.state(), WorkerState::Running);
    assert!(!handle.is_finished());
}
