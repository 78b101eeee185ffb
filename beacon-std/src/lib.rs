//! # beacon-std
//!
//! The dispatch engine and standard implementations for Beacon.
//!
//! This crate provides:
//! - **Dispatch engine**: [`Dispatcher`], built with [`DispatcherBuilder`]
//!   and configured with [`DispatchOptions`]
//! - **Process-wide accessor**: the [`global`] module and the [`Dispatch`]
//!   extension for `Message`
//! - **Standard sinks**: [`LogSink`]
//! - **Standard listeners**: Filter, Timeout, Logging
//! - **Testing fixtures**: [`testing`]
//!
//! [`Dispatcher`]: dispatcher::Dispatcher
//! [`DispatcherBuilder`]: builder::DispatcherBuilder
//! [`DispatchOptions`]: options::DispatchOptions
//! [`Dispatch`]: global::Dispatch
//! [`LogSink`]: sinks::LogSink

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use beacon_core;

// Modules
mod buffer;
pub mod builder;
pub mod dispatcher;
mod fanout;
pub mod global;
pub mod listeners;
pub mod options;
mod runtime;
pub mod sinks;
pub mod testing;
