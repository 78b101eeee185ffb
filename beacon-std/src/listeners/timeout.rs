//! Timeout Listener - Time-limited delivery wrapper.
//!
//! The dispatcher never times out a listener on its own. Wrap listeners
//! that talk to slow or unreliable backends so a hung `send` turns into a
//! reported failure instead of an outstanding task.

use beacon_core::{BoxError, Listener, Message};
use std::{future::Future, time::Duration};
use thiserror::Error;

/// Error returned when a listener does not finish in time.
#[derive(Debug, Clone, Error)]
#[error("listener `{listener}` timed out after {duration:?}")]
pub struct TimeoutError {
    listener: String,
    duration: Duration,
}

impl TimeoutError {
    /// Get the duration that was exceeded.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Name of the listener that timed out.
    pub fn listener(&self) -> &str {
        &self.listener
    }
}

/// A Listener that bounds the inner listener's `send` with a timeout.
///
/// Uses `tokio::time::timeout`; `initialize` is not bounded.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// // Give the analytics backend 2 seconds per message
/// let timed = TimeoutListener::new(Analytics::new(), Duration::from_secs(2));
/// ```
pub struct TimeoutListener<L> {
    inner: L,
    duration: Duration,
}

impl<L> TimeoutListener<L> {
    /// Create a new `TimeoutListener` wrapping the given listener.
    pub fn new(inner: L, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// Create a `TimeoutListener` with the timeout specified in milliseconds.
    pub fn millis(inner: L, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Get the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Get a reference to the inner listener.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: Listener> Listener for TimeoutListener<L> {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        match tokio::time::timeout(self.duration, self.inner.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(TimeoutError {
                listener: self.inner.name().to_owned(),
                duration: self.duration,
            }
            .into()),
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

    struct Sleepy {
        delay: Duration,
    }

    impl Listener for Sleepy {
        async fn send(&self, _message: &Message) -> Result<(), BoxError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        fn name(&self) -> &str {
            "sleepy"
        }
    }

    #[test]
    fn test_timeout_listener_millis() {
        let listener = TimeoutListener::millis(
            Sleepy {
                delay: Duration::ZERO,
            },
            500,
        );
        assert_eq!(listener.duration(), Duration::from_millis(500));
        assert_eq!(listener.inner().delay, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_timeout_trigger() {
        let listener = TimeoutListener::millis(
            Sleepy {
                delay: Duration::from_millis(50),
            },
            10,
        );

        let err = listener.send(&Message::new("evt")).await.unwrap_err();
        let timeout = err.downcast_ref::<TimeoutError>().unwrap();
        assert_eq!(timeout.listener(), "sleepy");
        assert!(err.to_string().contains("10ms"));
    }

    #[tokio::test]
    async fn test_timeout_success() {
        let listener = TimeoutListener::millis(
            Sleepy {
                delay: Duration::ZERO,
            },
            100,
        );

        assert!(listener.send(&Message::new("evt")).await.is_ok());
        assert_eq!(listener.name(), "sleepy");
    }
}
