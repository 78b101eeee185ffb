//! Process-wide dispatcher accessor.
//!
//! Instrumentation call sites often have no handle to pass around. This
//! module holds at most one installed [`Dispatcher`] and forwards to it.
//!
//! Every entry point is fail-open: with nothing installed, submissions are
//! dropped and gate changes are ignored, so instrumentation never blocks
//! application logic. Prefer passing an `Arc<Dispatcher>` where possible.

use crate::dispatcher::Dispatcher;
use beacon_core::Message;
use std::sync::{Arc, PoisonError, RwLock};

static CURRENT: RwLock<Option<Arc<Dispatcher>>> = RwLock::new(None);

/// Install `dispatcher` as the process-wide instance.
///
/// Returns the dispatcher it replaced, if any. Replacing is allowed but
/// logged, since messages in flight or buffered on the old instance stay
/// with the old instance.
pub fn install(dispatcher: Arc<Dispatcher>) -> Option<Arc<Dispatcher>> {
    let previous = CURRENT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(dispatcher);
    if let Some(previous) = &previous {
        tracing::warn!(
            buffered = previous.buffered(),
            "replacing the installed dispatcher"
        );
    }
    previous
}

/// Remove the process-wide instance.
pub fn uninstall() -> Option<Arc<Dispatcher>> {
    CURRENT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

/// The installed dispatcher, if any.
pub fn current() -> Option<Arc<Dispatcher>> {
    CURRENT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Whether a dispatcher is installed.
pub fn is_installed() -> bool {
    CURRENT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Submit to the installed dispatcher; dropped if none is installed.
pub fn submit(message: Message) {
    match current() {
        Some(dispatcher) => dispatcher.submit(message),
        None => tracing::trace!(message_id = message.id(), "no dispatcher installed, message dropped"),
    }
}

/// Open or close the installed dispatcher's gate; ignored if none is installed.
pub fn set_enabled(enabled: bool) {
    if let Some(dispatcher) = current() {
        dispatcher.set_enabled(enabled);
    }
}

/// Send a message through the process-wide dispatcher.
///
/// # Example
///
/// ```rust,ignore
/// use beacon::prelude::*;
///
/// Message::new("app_started").with("version", "1.2.0").dispatch();
/// ```
pub trait Dispatch {
    /// Hand `self` to the installed dispatcher.
    fn dispatch(self);
}

impl Dispatch for Message {
    fn dispatch(self) {
        submit(self)
    }
}
