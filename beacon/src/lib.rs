//! # beacon - In-Process Event Fan-Out
//!
//! `beacon` decouples "an event happened" from "what handles the event".
//! Application code builds small [`Message`]s and submits them to a
//! [`Dispatcher`], which forwards each message concurrently to every
//! registered [`Listener`] (analytics backends, logging sinks, crash
//! reporters). A listener that fails or panics never affects delivery to the
//! others; its failure is reported to the configured [`FailureSink`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beacon::prelude::*;
//! use std::sync::Arc;
//!
//! struct Analytics;
//!
//! impl Listener for Analytics {
//!     async fn send(&self, message: &Message) -> Result<(), BoxError> {
//!         // forward to the backend
//!         Ok(())
//!     }
//! }
//!
//! let dispatcher = Dispatcher::builder()
//!     .add(Arc::new(Analytics))
//!     .activate(DispatchOptions::new().with_buffer(true))?;
//!
//! // Buffered until the user opts in
//! Message::new("app_started").with("version", "1.2.0").dispatch();
//! dispatcher.set_enabled(true);
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use beacon_core::{
    // Error types
    BoxError,
    DeliveryError,
    DispatchError,
    // Listener
    DynListener,
    // Sink
    FailureSink,
    FnListener,
    Listener,
    // Message
    Message,
    MessageError,
    Stage,
    listener_fn,
};

// Engine
pub use beacon_std::{
    builder::DispatcherBuilder,
    dispatcher::Dispatcher,
    global::Dispatch,
    options::{DispatchOptions, OverflowPolicy},
    sinks::LogSink,
};

/// Process-wide dispatcher accessor.
pub mod global {
    pub use beacon_std::global::{
        Dispatch, current, install, is_installed, set_enabled, submit, uninstall,
    };
}

/// Standard listener implementations.
pub mod listeners {
    pub use beacon_std::listeners::{
        filter::FilterListener,
        logging::LoggingListener,
        timeout::{TimeoutError, TimeoutListener},
    };
}

/// Testing utilities.
pub mod testing {
    pub use beacon_std::testing::{CollectingSink, RecordingListener};
}

/// Prelude module - common imports for Beacon.
///
/// # Usage
///
/// ```rust,ignore
/// use beacon::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, DeliveryError, Dispatch, DispatchOptions, Dispatcher, DispatcherBuilder,
        FailureSink, Listener, Message,
    };
}
