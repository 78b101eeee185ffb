//! Listener registration.

use crate::{dispatcher::Dispatcher, global, options::DispatchOptions};
use beacon_core::{DispatchError, DynListener, Listener};
use std::sync::Arc;

/// Builder for constructing a [`Dispatcher`].
///
/// Listeners are identified by their `Arc`: adding the same `Arc` twice
/// registers it once. The set is frozen when the dispatcher is built.
///
/// # Example
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .add(Arc::new(Analytics::new()))
///     .add(Arc::new(CrashReporter::new()))
///     .build(DispatchOptions::new().with_enabled(true))?;
/// ```
#[derive(Default)]
pub struct DispatcherBuilder {
    listeners: Vec<Arc<dyn DynListener>>,
}

impl DispatcherBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener.
    pub fn add<L: Listener>(mut self, listener: Arc<L>) -> Self {
        self.add_mut(listener);
        self
    }

    /// Register a listener (mutable version).
    ///
    /// Returns `false` if this `Arc` was already registered.
    pub fn add_mut<L: Listener>(&mut self, listener: Arc<L>) -> bool {
        self.add_dyn_mut(listener)
    }

    /// Register a type-erased listener.
    pub fn add_dyn(mut self, listener: Arc<dyn DynListener>) -> Self {
        self.add_dyn_mut(listener);
        self
    }

    /// Register a type-erased listener (mutable version).
    pub fn add_dyn_mut(&mut self, listener: Arc<dyn DynListener>) -> bool {
        let ptr = Arc::as_ptr(&listener).cast::<()>();
        if self
            .listeners
            .iter()
            .any(|existing| Arc::as_ptr(existing).cast::<()>() == ptr)
        {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Get the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if the builder has no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Build an owned dispatcher.
    ///
    /// Fails only when no runtime was configured and none is current.
    pub fn build(self, options: DispatchOptions) -> Result<Arc<Dispatcher>, DispatchError> {
        Dispatcher::new(self.listeners, options).map(Arc::new)
    }

    /// Build a dispatcher and install it as the process-wide instance.
    ///
    /// A previously installed dispatcher is replaced; see [`global::install`].
    pub fn activate(self, options: DispatchOptions) -> Result<Arc<Dispatcher>, DispatchError> {
        let dispatcher = self.build(options)?;
        global::install(Arc::clone(&dispatcher));
        Ok(dispatcher)
    }
}
