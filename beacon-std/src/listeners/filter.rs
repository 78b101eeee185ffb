//! Filter Listener - Forwards only matching messages.

use beacon_core::{BoxError, Listener, Message};
use std::future::Future;

/// A `Listener` that forwards a message to `inner` only if the predicate
/// returns `true`.
///
/// Messages that don't match are skipped without error.
///
/// # Example
///
/// ```rust,ignore
/// use beacon::listeners::filter::FilterListener;
///
/// // Only crash events reach the crash reporter
/// let crashes = FilterListener::new(CrashReporter::new(), |message: &Message| {
///     message.id().starts_with("crash.")
/// });
/// ```
pub struct FilterListener<L, F> {
    inner: L,
    predicate: F,
}

impl<L, F> FilterListener<L, F> {
    /// Create a new `FilterListener` around `inner`.
    pub fn new(inner: L, predicate: F) -> Self {
        Self { inner, predicate }
    }

    /// Get a reference to the inner listener.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L, F> Listener for FilterListener<L, F>
where
    L: Listener,
    F: Fn(&Message) -> bool + Send + Sync + 'static,
{
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        if (self.predicate)(message) {
            self.inner.send(message).await
        } else {
            Ok(())
        }
    }

    fn initialize(&self) -> impl Future<Output = Result<(), BoxError>> + Send {
        self.inner.initialize()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingListener;

    #[tokio::test]
    async fn test_filter_passes() {
        let filter = FilterListener::new(RecordingListener::new("rec"), |m: &Message| {
            m.id().starts_with("crash.")
        });

        filter.send(&Message::new("crash.oom")).await.unwrap();
        assert_eq!(filter.inner().ids(), ["crash.oom"]);
    }

    #[tokio::test]
    async fn test_filter_rejects() {
        let filter = FilterListener::new(RecordingListener::new("rec"), |m: &Message| {
            m.id().starts_with("crash.")
        });

        filter.send(&Message::new("page_view")).await.unwrap();
        assert_eq!(filter.inner().count(), 0);
    }

    #[tokio::test]
    async fn test_filter_delegates_name_and_initialize() {
        let filter = FilterListener::new(RecordingListener::new("rec"), |_: &Message| true);

        assert_eq!(filter.name(), "rec");
        filter.initialize().await.unwrap();
        assert_eq!(filter.inner().initializations(), 1);
    }
}
