//! Dispatcher configuration.

use crate::sinks::LogSink;
use beacon_core::FailureSink;
use std::{fmt, sync::Arc};
use tokio::runtime::Handle;

/// What to do when a bounded buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest buffered message to make room.
    #[default]
    DropOldest,
    /// Discard the incoming message.
    DropNewest,
}

/// Options applied when a dispatcher is built.
///
/// # Example
/// ```ignore
/// let options = DispatchOptions::new()
///     .with_enabled(false)
///     .with_buffer(true)
///     .with_failure_sink(|failure| eprintln!("{failure}"));
/// ```
#[derive(Clone)]
pub struct DispatchOptions {
    /// Whether the gate starts enabled. Default is `false`.
    pub enabled_by_default: bool,
    /// Whether messages submitted while disabled are kept until re-enabled.
    pub use_buffer: bool,
    /// Maximum buffered messages. `None` keeps every message.
    pub buffer_capacity: Option<usize>,
    /// Overflow behavior once `buffer_capacity` is reached.
    pub overflow: OverflowPolicy,
    failure_sink: Arc<dyn FailureSink>,
    runtime: Option<Handle>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchOptions {
    /// Disabled, unbuffered, reporting failures to [`LogSink`].
    pub fn new() -> Self {
        Self {
            enabled_by_default: false,
            use_buffer: false,
            buffer_capacity: None,
            overflow: OverflowPolicy::default(),
            failure_sink: Arc::new(LogSink),
            runtime: None,
        }
    }

    /// Set the initial gate state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }

    /// Enable or disable the pre-enable buffer.
    pub fn with_buffer(mut self, use_buffer: bool) -> Self {
        self.use_buffer = use_buffer;
        self
    }

    /// Bound the buffer, applying `overflow` when it is full.
    pub fn with_buffer_capacity(mut self, capacity: usize, overflow: OverflowPolicy) -> Self {
        self.buffer_capacity = Some(capacity);
        self.overflow = overflow;
        self
    }

    /// Set the sink receiving listener failures.
    pub fn with_failure_sink<S: FailureSink>(mut self, sink: S) -> Self {
        self.failure_sink = Arc::new(sink);
        self
    }

    /// Set a shared sink receiving listener failures.
    pub fn with_shared_failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.failure_sink = sink;
        self
    }

    /// Run deliveries on the given runtime instead of the current one.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub(crate) fn failure_sink(&self) -> Arc<dyn FailureSink> {
        Arc::clone(&self.failure_sink)
    }

    pub(crate) fn runtime(&self) -> Option<Handle> {
        self.runtime.clone()
    }
}

impl fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("enabled_by_default", &self.enabled_by_default)
            .field("use_buffer", &self.use_buffer)
            .field("buffer_capacity", &self.buffer_capacity)
            .field("overflow", &self.overflow)
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DispatchOptions::default();
        assert!(!options.enabled_by_default);
        assert!(!options.use_buffer);
        assert_eq!(options.buffer_capacity, None);
        assert_eq!(options.overflow, OverflowPolicy::DropOldest);
        assert!(options.runtime().is_none());
    }

    #[test]
    fn test_setters() {
        let options = DispatchOptions::new()
            .with_enabled(true)
            .with_buffer(true)
            .with_buffer_capacity(8, OverflowPolicy::DropNewest);
        assert!(options.enabled_by_default);
        assert!(options.use_buffer);
        assert_eq!(options.buffer_capacity, Some(8));
        assert_eq!(options.overflow, OverflowPolicy::DropNewest);
    }
}
