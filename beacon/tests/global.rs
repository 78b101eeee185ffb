//! Process-wide dispatcher tests.
//!
//! These tests share one installed dispatcher, so each holds `GLOBAL_LOCK`.

use beacon::{
    DispatchOptions, Dispatcher, Message, global,
    prelude::Dispatch,
    testing::{CollectingSink, RecordingListener},
};
use lazy_static::lazy_static;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

mod common;
use common::{ID, KEY, VALUE, init_tracing};

lazy_static! {
    static ref GLOBAL_LOCK: Mutex<()> = Mutex::new(());
}

async fn exclusive() -> MutexGuard<'static, ()> {
    let guard = GLOBAL_LOCK.lock().await;
    global::uninstall();
    guard
}

#[tokio::test]
async fn test_no_message_sent_when_not_activated() {
    let _guard = exclusive().await;
    let recorder = Arc::new(RecordingListener::new("recorder"));
    let dispatcher = Dispatcher::builder()
        .add(recorder.clone())
        .build(DispatchOptions::new().with_enabled(true))
        .unwrap();

    assert!(!global::is_installed());
    Message::new(ID).with(KEY, VALUE).dispatch();
    global::set_enabled(true);

    dispatcher.wait_idle().await;
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn test_dispatch_to_multiple_receivers() {
    let _guard = exclusive().await;
    init_tracing();
    let jack = Arc::new(RecordingListener::new("jack"));
    let william = Arc::new(RecordingListener::new("william"));
    let vance = Arc::new(RecordingListener::new("vance"));

    let dispatcher = Dispatcher::builder()
        .add(jack.clone())
        .add(william.clone())
        .add(vance.clone())
        .activate(DispatchOptions::new().with_enabled(true))
        .unwrap();

    Message::new(ID).with(KEY, VALUE).dispatch();
    dispatcher.wait_idle().await;

    for listener in [&jack, &william, &vance] {
        let received = listener.messages();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id(), ID);
        assert_eq!(received[0].get(KEY), Some(VALUE));
    }
}

#[tokio::test]
async fn test_dispatch_and_crash() {
    let _guard = exclusive().await;
    let sink = CollectingSink::new();
    let jack = Arc::new(RecordingListener::new("jack"));
    let william = Arc::new(RecordingListener::failing("william", "An exception appeared"));
    let vance = Arc::new(RecordingListener::new("vance"));

    let dispatcher = Dispatcher::builder()
        .add(jack.clone())
        .add(william.clone())
        .add(vance.clone())
        .activate(
            DispatchOptions::new()
                .with_enabled(true)
                .with_failure_sink(sink.clone()),
        )
        .unwrap();

    Message::new(ID).with(KEY, VALUE).dispatch();
    dispatcher.wait_idle().await;

    // All listeners still receive the message
    for listener in [&jack, &william, &vance] {
        assert_eq!(listener.count(), 1);
        assert_eq!(listener.messages()[0].get(KEY), Some(VALUE));
    }
    assert_eq!(sink.original_messages(), ["An exception appeared"]);
}

#[tokio::test]
async fn test_global_enable_flushes_buffer() {
    let _guard = exclusive().await;
    let recorder = Arc::new(RecordingListener::new("recorder"));

    let dispatcher = Dispatcher::builder()
        .add(recorder.clone())
        .activate(DispatchOptions::new().with_buffer(true))
        .unwrap();

    Message::new("m1").dispatch();
    Message::new("m2").dispatch();
    assert_eq!(dispatcher.buffered(), 2);

    global::set_enabled(true);
    dispatcher.wait_idle().await;
    assert!(dispatcher.is_enabled());
    assert_eq!(recorder.ids(), ["m1", "m2"]);
}

#[tokio::test]
async fn test_reactivation_replaces_instance() {
    let _guard = exclusive().await;
    let first = Arc::new(RecordingListener::new("first"));
    let second = Arc::new(RecordingListener::new("second"));

    let old = Dispatcher::builder()
        .add(first.clone())
        .activate(DispatchOptions::new().with_enabled(true))
        .unwrap();
    let new = Dispatcher::builder()
        .add(second.clone())
        .activate(DispatchOptions::new().with_enabled(true))
        .unwrap();

    assert!(Arc::ptr_eq(&global::current().unwrap(), &new));

    Message::new("evt").dispatch();
    old.wait_idle().await;
    new.wait_idle().await;

    assert_eq!(first.count(), 0);
    assert_eq!(second.ids(), ["evt"]);
}

#[tokio::test]
async fn test_install_returns_previous() {
    let _guard = exclusive().await;
    let a = Dispatcher::builder().build(DispatchOptions::new()).unwrap();
    let b = Dispatcher::builder().build(DispatchOptions::new()).unwrap();

    assert!(global::install(a.clone()).is_none());
    let previous = global::install(b.clone()).unwrap();
    assert!(Arc::ptr_eq(&previous, &a));

    let removed = global::uninstall().unwrap();
    assert!(Arc::ptr_eq(&removed, &b));
    assert!(!global::is_installed());
}
