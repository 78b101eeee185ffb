//! Error types for Beacon.
//!
//! This module provides a small error hierarchy using `thiserror`:
//!
//! - [`MessageError`] - A message was constructed incorrectly
//! - [`DispatchError`] - A dispatcher could not be built
//! - [`DeliveryError`] - A listener failed; only ever observed by a [`FailureSink`]
//!
//! [`FailureSink`]: crate::FailureSink

use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised synchronously when building a [`Message`](crate::Message).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The message id was empty.
    #[error("message id must not be empty")]
    EmptyId,
}

/// Errors that can occur while building a dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No runtime was configured or current, and the default runtime
    /// could not be started.
    #[error("failed to start the default delivery runtime")]
    Runtime(#[source] std::io::Error),
}

/// The step of a delivery unit that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Lazy listener initialization.
    Initialize,
    /// Forwarding a message to the listener.
    Send,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Initialize => f.write_str("initialize"),
            Stage::Send => f.write_str("send"),
        }
    }
}

/// A failure of a single listener during delivery.
///
/// Delivery errors never reach the code that submitted the message. They
/// are routed to the failure sink configured on the dispatcher, carrying
/// the original error returned by the listener.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The listener's lazy initialization returned an error.
    #[error("listener `{listener}` failed to initialize")]
    Initialize {
        /// Name of the failing listener.
        listener: String,
        /// The error returned by the listener.
        #[source]
        source: BoxError,
    },

    /// The listener returned an error while handling a message.
    #[error("listener `{listener}` failed to send message `{message_id}`")]
    Send {
        /// Name of the failing listener.
        listener: String,
        /// Id of the message being delivered.
        message_id: String,
        /// The error returned by the listener.
        #[source]
        source: BoxError,
    },

    /// The listener panicked.
    #[error("listener `{listener}` panicked during {stage}: {payload}")]
    Panicked {
        /// Name of the failing listener.
        listener: String,
        /// Step that panicked.
        stage: Stage,
        /// Panic payload rendered as text.
        payload: String,
    },
}

impl DeliveryError {
    /// Name of the listener that failed.
    pub fn listener(&self) -> &str {
        match self {
            DeliveryError::Initialize { listener, .. }
            | DeliveryError::Send { listener, .. }
            | DeliveryError::Panicked { listener, .. } => listener,
        }
    }

    /// The step that failed.
    pub fn stage(&self) -> Stage {
        match self {
            DeliveryError::Initialize { .. } => Stage::Initialize,
            DeliveryError::Send { .. } => Stage::Send,
            DeliveryError::Panicked { stage, .. } => *stage,
        }
    }

    /// The error object the listener returned, if it returned one.
    ///
    /// `None` for panics, which carry no error value.
    pub fn original(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DeliveryError::Initialize { source, .. } | DeliveryError::Send { source, .. } => {
                Some(source.as_ref())
            }
            DeliveryError::Panicked { .. } => None,
        }
    }

    /// Consumes the failure and returns the listener's original error.
    pub fn into_original(self) -> Option<BoxError> {
        match self {
            DeliveryError::Initialize { source, .. } | DeliveryError::Send { source, .. } => {
                Some(source)
            }
            DeliveryError::Panicked { .. } => None,
        }
    }
}
