//! Standard failure sinks.

use beacon_core::{DeliveryError, FailureSink};
use std::{error::Error, fmt::Write};
use tracing::subscriber::NoSubscriber;

/// The default sink: logs every failure.
///
/// Emits a `tracing` error event to the subscriber active on the reporting
/// thread, global or scoped. With no subscriber at all, the failure is
/// written to standard error instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl FailureSink for LogSink {
    fn report(&self, failure: DeliveryError) {
        let chain = render_chain(&failure);
        if subscriber_active() {
            tracing::error!(
                listener = failure.listener(),
                stage = %failure.stage(),
                error = %chain,
                "listener failed"
            );
        } else {
            eprintln!("beacon: {chain}");
        }
    }
}

fn subscriber_active() -> bool {
    tracing::dispatcher::get_default(|dispatch| !dispatch.is::<NoSubscriber>())
}

/// Render an error and its sources as `outer: inner: root`.
pub(crate) fn render_chain(error: &dyn Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}
