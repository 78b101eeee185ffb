//! # Listener capability
//!
//! A Listener (a "tracking tool") receives every message submitted to a
//! dispatcher it is registered with. Analytics backends, logging sinks and
//! crash reporters are typical implementations.
//!
//! The dispatcher treats listeners as opaque: it calls [`Listener::initialize`]
//! once before the first message, then [`Listener::send`] once per message.
//! Any error (or panic) from either call is isolated to that listener and
//! routed to the dispatcher's failure sink.

use crate::{error::BoxError, message::Message};
use std::{future::Future, pin::Pin, sync::Arc};

/// A destination for dispatched messages.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener`",
    label = "missing `Listener` implementation",
    note = "Listeners must implement the `send` method to receive messages."
)]
pub trait Listener: Send + Sync + 'static {
    /// Handle a single message.
    fn send(&self, message: &Message) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// One-time setup, run by the dispatcher before the first `send`.
    ///
    /// Runs again on the next delivery if it fails.
    fn initialize(&self) -> impl Future<Output = Result<(), BoxError>> + Send {
        async { Ok(()) }
    }

    /// Name used in failure reports and log fields.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Dynamic object-safe version of [`Listener`].
///
/// Dispatchers store listeners as `Arc<dyn DynListener>`.
pub trait DynListener: Send + Sync + 'static {
    /// Handle a single message (dynamic dispatch version).
    fn send_dyn<'a>(
        &'a self,
        message: &'a Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;

    /// One-time setup (dynamic dispatch version).
    fn initialize_dyn<'a>(&'a self)
    -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;

    /// Name used in failure reports.
    fn name_dyn(&self) -> &str;
}

// Blanket implementation: Any type implementing Listener implements DynListener automatically.
impl<L: Listener> DynListener for L {
    fn send_dyn<'a>(
        &'a self,
        message: &'a Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.send(message))
    }

    fn initialize_dyn<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.initialize())
    }

    fn name_dyn(&self) -> &str {
        self.name()
    }
}

// Shared listeners: lets wrappers hold a listener that is also inspected elsewhere.
impl<L: Listener> Listener for Arc<L> {
    fn send(&self, message: &Message) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).send(message)
    }

    fn initialize(&self) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).initialize()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A listener backed by a closure.
///
/// The closure receives an owned clone of each message.
pub struct FnListener<F> {
    name: String,
    func: F,
}

/// Create a [`FnListener`] from a name and a closure.
///
/// # Example
///
/// ```rust,ignore
/// let printer = listener_fn("printer", |message: Message| async move {
///     println!("{}", message.id());
///     Ok(())
/// });
/// ```
pub fn listener_fn<F, Fut>(name: impl Into<String>, func: F) -> FnListener<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    FnListener {
        name: name.into(),
        func,
    }
}

impl<F, Fut> Listener for FnListener<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn send(&self, message: &Message) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self.func)(message.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
