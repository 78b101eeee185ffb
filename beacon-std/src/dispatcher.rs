//! The dispatch engine.
//!
//! A [`Dispatcher`] owns a frozen listener set, an enabled/disabled gate and
//! an optional buffer of messages submitted while the gate was closed.
//!
//! # Gate semantics
//!
//! | gate     | buffering | `submit`                         |
//! |----------|-----------|----------------------------------|
//! | enabled  | any       | fan-out to every listener now    |
//! | disabled | on        | appended to the buffer           |
//! | disabled | off       | dropped                          |
//!
//! Re-enabling drains the buffer and delivers it in submission order.

use crate::{
    buffer::MessageBuffer,
    builder::DispatcherBuilder,
    fanout::{Fanout, ListenerSlot},
    options::DispatchOptions,
    runtime,
};
use beacon_core::{DispatchError, DynListener, Message};
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

struct Gate {
    enabled: bool,
    buffer: Option<MessageBuffer>,
}

/// Fans submitted messages out to every registered listener.
///
/// Created with [`DispatcherBuilder`]. All methods take `&self`; share the
/// dispatcher through the returned `Arc`.
pub struct Dispatcher {
    fanout: Fanout,
    gate: Mutex<Gate>,
}

impl Dispatcher {
    /// Start registering listeners.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub(crate) fn new(
        listeners: Vec<Arc<dyn DynListener>>,
        options: DispatchOptions,
    ) -> Result<Self, DispatchError> {
        let runtime = runtime::resolve(options.runtime())?;
        let slots: Vec<_> = listeners
            .into_iter()
            .map(|listener| Arc::new(ListenerSlot::new(listener)))
            .collect();
        let buffer = options
            .use_buffer
            .then(|| MessageBuffer::new(options.buffer_capacity, options.overflow));

        tracing::debug!(
            listeners = slots.len(),
            enabled = options.enabled_by_default,
            buffered = options.use_buffer,
            "dispatcher built"
        );

        Ok(Self {
            fanout: Fanout::new(slots, options.failure_sink(), runtime),
            gate: Mutex::new(Gate {
                enabled: options.enabled_by_default,
                buffer,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit a message for delivery.
    ///
    /// Never blocks on listeners and never fails: delivery happens on
    /// background tasks and listener failures go to the failure sink.
    pub fn submit(&self, message: Message) {
        let message = Arc::new(message);
        {
            let mut gate = self.lock();
            if !gate.enabled {
                match gate.buffer.as_mut() {
                    Some(buffer) => {
                        if let Some(discarded) = buffer.push(Arc::clone(&message)) {
                            tracing::warn!(
                                message_id = discarded.id(),
                                buffered = buffer.len(),
                                "message buffer full, discarding message"
                            );
                        } else {
                            tracing::trace!(
                                message_id = message.id(),
                                buffered = buffer.len(),
                                "message buffered"
                            );
                        }
                    }
                    None => {
                        tracing::trace!(message_id = message.id(), "dispatcher disabled, message dropped");
                    }
                }
                return;
            }
        }
        self.fanout.deliver(message);
    }

    /// Open or close the gate.
    ///
    /// Opening a closed gate flushes buffered messages, in submission order,
    /// before any message submitted afterwards is scheduled.
    pub fn set_enabled(&self, enabled: bool) {
        let mut gate = self.lock();
        let was_enabled = std::mem::replace(&mut gate.enabled, enabled);
        if was_enabled == enabled {
            return;
        }
        tracing::debug!(enabled, "dispatcher gate changed");
        if !enabled {
            return;
        }
        if let Some(buffer) = gate.buffer.as_mut() {
            let batch = buffer.drain();
            if !batch.is_empty() {
                tracing::debug!(buffered = batch.len(), "flushing buffered messages");
                // Spawned before the lock is released; spawning never waits on listeners.
                self.fanout.flush(batch);
            }
        }
    }

    /// Whether submitted messages are delivered immediately.
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Number of messages waiting for the gate to open.
    pub fn buffered(&self) -> usize {
        self.lock().buffer.as_ref().map_or(0, MessageBuffer::len)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.fanout.listener_count()
    }

    /// Number of delivery tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.fanout.in_flight().current()
    }

    /// Wait until every scheduled delivery has finished.
    ///
    /// Deliveries to a listener that never returns keep this pending.
    pub async fn wait_idle(&self) {
        self.fanout.in_flight().wait_idle().await
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = self.lock();
        f.debug_struct("Dispatcher")
            .field("listeners", &self.fanout.listener_count())
            .field("enabled", &gate.enabled)
            .field("buffered", &gate.buffer.as_ref().map(MessageBuffer::len))
            .field("in_flight", &self.fanout.in_flight().current())
            .finish()
    }
}
