//! Logging Listener - A tracking tool that writes messages to the log.

use beacon_core::{BoxError, Listener, Message};

/// A listener that logs every message it receives.
///
/// Messages are emitted as `tracing` debug events carrying the message id,
/// timestamp and payload.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = Dispatcher::builder()
///     .add(Arc::new(LoggingListener::named("audit")))
///     .build(DispatchOptions::new().with_enabled(true))?;
/// ```
pub struct LoggingListener {
    name: &'static str,
}

impl LoggingListener {
    /// Create a new `LoggingListener` with a default name.
    pub fn new() -> Self {
        Self { name: "log" }
    }

    /// Create a new `LoggingListener` with a custom name.
    ///
    /// The name is used in log events and failure reports.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for LoggingListener {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        tracing::debug!(
            name = %self.name,
            message_id = message.id(),
            timestamp = %message.timestamp(),
            data = ?message.data(),
            "message received"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        self.name
    }
}
