//! # beacon-core
//!
//! Core types for the Beacon event fan-out dispatcher.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! listener implementations (analytics backends, log shippers, crash
//! reporters) that don't need the dispatch engine in `beacon-std`.
//!
//! # Building Blocks
//!
//! - [`Message`]: an immutable id and timestamp plus a mutable string payload
//! - [`Listener`]: a destination that receives every dispatched message
//! - [`FailureSink`]: the single place listener failures are reported
//!
//! # Error Types
//!
//! - [`MessageError`] - Invalid message construction
//! - [`DispatchError`] - Dispatcher construction errors
//! - [`DeliveryError`] - Per-listener delivery failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod listener;
mod message;
mod sink;

// Re-exports
pub use error::{BoxError, DeliveryError, DispatchError, MessageError, Stage};
pub use listener::{DynListener, FnListener, Listener, listener_fn};
pub use message::Message;
pub use sink::FailureSink;
