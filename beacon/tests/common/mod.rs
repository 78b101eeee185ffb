#![allow(dead_code)]

use beacon::{BoxError, Listener, Message};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

pub const ID: &str = "I believe we've had a problem here.";
pub const KEY: &str = "problem";
pub const VALUE: &str = "explosion and rupture of oxygen tank 2";

// ============================================================================
// Setup
// ============================================================================

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `condition` until it holds, failing the test after one second.
pub async fn eventually(condition: impl Fn() -> bool) {
    let wait = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(1), wait)
        .await
        .expect("condition not reached within 1s");
}

// ============================================================================
// Test Listeners
// ============================================================================

/// Blocks in `send` until released.
pub struct GatedListener {
    pub entered: AtomicUsize,
    pub release: Notify,
}

impl GatedListener {
    pub fn new() -> Self {
        Self {
            entered: AtomicUsize::new(0),
            release: Notify::new(),
        }
    }

    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }
}

impl Listener for GatedListener {
    async fn send(&self, _message: &Message) -> Result<(), BoxError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(())
    }

    fn name(&self) -> &str {
        "gated"
    }
}

pub struct PanickingListener;

impl Listener for PanickingListener {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        panic!("cannot handle {}", message.id());
    }

    fn name(&self) -> &str {
        "panicking"
    }
}
