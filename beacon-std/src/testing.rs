//! Testing utilities for Beacon.
//!
//! This module provides fixtures that make testing dispatchers and
//! listeners easier.
//!
//! # Features
//!
//! - [`RecordingListener`]: A listener that records every message it receives
//!   and can be programmed to fail
//! - [`CollectingSink`]: A failure sink that keeps every reported failure

use beacon_core::{BoxError, DeliveryError, FailureSink, Listener, Message};
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

// ============================================================================
// Recording Listener
// ============================================================================

/// A listener that records all messages it receives.
///
/// Register it behind an `Arc` and keep a clone to inspect what arrived.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = Arc::new(RecordingListener::new("recorder"));
///
/// let dispatcher = Dispatcher::builder()
///     .add(recorder.clone())
///     .build(DispatchOptions::new().with_enabled(true))?;
///
/// dispatcher.submit(Message::new("evt"));
/// dispatcher.wait_idle().await;
///
/// assert_eq!(recorder.ids(), ["evt"]);
/// ```
pub struct RecordingListener {
    name: String,
    messages: Mutex<Vec<Message>>,
    initializations: AtomicUsize,
    failing_initializations: AtomicUsize,
    send_error: Mutex<Option<String>>,
    init_delay: Mutex<Option<Duration>>,
    send_delays: Mutex<VecDeque<Duration>>,
}

impl RecordingListener {
    /// Create a new recording listener that always succeeds.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Mutex::new(Vec::new()),
            initializations: AtomicUsize::new(0),
            failing_initializations: AtomicUsize::new(0),
            send_error: Mutex::new(None),
            init_delay: Mutex::new(None),
            send_delays: Mutex::new(VecDeque::new()),
        }
    }

    /// Create a recording listener whose `send` records, then fails with `error`.
    pub fn failing(name: impl Into<String>, error: impl Into<String>) -> Self {
        let listener = Self::new(name);
        listener.set_error(error);
        listener
    }

    /// Make subsequent sends fail with `error`.
    pub fn set_error(&self, error: impl Into<String>) {
        *lock(&self.send_error) = Some(error.into());
    }

    /// Clear error state.
    pub fn clear_error(&self) {
        *lock(&self.send_error) = None;
    }

    /// Make the next `count` initialization attempts fail.
    pub fn fail_initializations(&self, count: usize) {
        self.failing_initializations.store(count, Ordering::SeqCst);
    }

    /// Make every `initialize` call sleep for `delay` first.
    pub fn delay_initialization(&self, delay: Duration) {
        *lock(&self.init_delay) = Some(delay);
    }

    /// Make the next `send` sleep for `delay` before recording its message.
    ///
    /// Calls queue up: each delay applies to one subsequent send.
    pub fn delay_next_send(&self, delay: Duration) {
        lock(&self.send_delays).push_back(delay);
    }

    /// Get a clone of the recorded messages.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.messages).clone()
    }

    /// Get the ids of the recorded messages, in arrival order.
    pub fn ids(&self) -> Vec<String> {
        lock(&self.messages)
            .iter()
            .map(|m| m.id().to_owned())
            .collect()
    }

    /// Get the number of recorded messages.
    pub fn count(&self) -> usize {
        lock(&self.messages).len()
    }

    /// Get the number of `initialize` calls, failed ones included.
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    /// Clear all recorded messages.
    pub fn clear(&self) {
        lock(&self.messages).clear();
    }
}

impl Listener for RecordingListener {
    async fn initialize(&self) -> Result<(), BoxError> {
        self.initializations.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.init_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let remaining = self.failing_initializations.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_initializations
                .store(remaining - 1, Ordering::SeqCst);
            return Err(format!("{} is not ready", self.name).into());
        }
        Ok(())
    }

    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        let delay = lock(&self.send_delays).pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.messages).push(message.clone());
        let error = lock(&self.send_error).clone();
        match error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Collecting Sink
// ============================================================================

/// A failure sink that collects every reported failure.
///
/// Cloning shares the underlying storage, so keep a clone after handing
/// one to [`DispatchOptions::with_failure_sink`].
///
/// [`DispatchOptions::with_failure_sink`]: crate::options::DispatchOptions::with_failure_sink
#[derive(Clone, Default)]
pub struct CollectingSink {
    failures: Arc<Mutex<Vec<DeliveryError>>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every failure collected so far.
    pub fn take(&self) -> Vec<DeliveryError> {
        std::mem::take(&mut *lock(&self.failures))
    }

    /// Get the number of collected failures.
    pub fn count(&self) -> usize {
        lock(&self.failures).len()
    }

    /// Get the rendered original errors, in report order.
    pub fn original_messages(&self) -> Vec<String> {
        lock(&self.failures)
            .iter()
            .filter_map(|f| f.original().map(ToString::to_string))
            .collect()
    }
}

impl FailureSink for CollectingSink {
    fn report(&self, failure: DeliveryError) {
        lock(&self.failures).push(failure);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
