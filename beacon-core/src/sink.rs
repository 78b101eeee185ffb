//! Failure sink capability.

use crate::error::DeliveryError;

/// Receives every listener failure observed by a dispatcher.
///
/// Sinks are invoked from delivery tasks, possibly concurrently, so they
/// must be `Send + Sync`. Closures taking a [`DeliveryError`] are sinks.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `FailureSink`",
    label = "missing `FailureSink` implementation",
    note = "Implement `FailureSink` or pass a closure `Fn(DeliveryError) + Send + Sync`."
)]
pub trait FailureSink: Send + Sync + 'static {
    /// Record a single listener failure.
    fn report(&self, failure: DeliveryError);
}

// Blanket impl for closures
impl<F> FailureSink for F
where
    F: Fn(DeliveryError) + Send + Sync + 'static,
{
    fn report(&self, failure: DeliveryError) {
        (self)(failure)
    }
}
