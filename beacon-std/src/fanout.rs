//! Concurrent, failure-isolated fan-out.
//!
//! Every (message, listener) pair runs as its own task on the dispatcher's
//! runtime. A failing, panicking, or slow listener never affects its
//! siblings: each task lazily initializes its listener, forwards the
//! message, and reports any failure to the failure sink on its own.
//!
//! Buffered batches are flushed with one task per listener that walks the
//! batch in order. A listener's flush task waits for its previous flush to
//! finish, so buffered messages arrive in submission order across any
//! number of enable/disable cycles.

use beacon_core::{DeliveryError, DynListener, FailureSink, Message, Stage};
use futures::FutureExt;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::{
    runtime::Handle,
    sync::{Notify, OnceCell, oneshot},
};
use tracing::Instrument;

/// A registered listener plus its lazy-initialization state.
pub(crate) struct ListenerSlot {
    listener: Arc<dyn DynListener>,
    ready: OnceCell<()>,
    // Resolves when the most recently scheduled flush for this listener ends.
    last_flush: Mutex<Option<oneshot::Receiver<()>>>,
}

impl ListenerSlot {
    pub(crate) fn new(listener: Arc<dyn DynListener>) -> Self {
        Self {
            listener,
            ready: OnceCell::new(),
            last_flush: Mutex::new(None),
        }
    }

    /// Queue a flush behind the previous one.
    ///
    /// Returns the previous flush to wait for and the sender that marks
    /// this flush done when dropped.
    fn enqueue_flush(&self) -> (Option<oneshot::Receiver<()>>, oneshot::Sender<()>) {
        let (done, finished) = oneshot::channel();
        let previous = self
            .last_flush
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(finished);
        (previous, done)
    }

    pub(crate) fn name(&self) -> &str {
        self.listener.name_dyn()
    }

    /// Runs `initialize` until it succeeds once.
    async fn ensure_initialized(&self) -> Result<(), DeliveryError> {
        self.ready
            .get_or_try_init(|| async {
                match AssertUnwindSafe(self.listener.initialize_dyn())
                    .catch_unwind()
                    .await
                {
                    Ok(Ok(())) => {
                        tracing::debug!(listener = self.name(), "listener initialized");
                        Ok(())
                    }
                    Ok(Err(source)) => Err(DeliveryError::Initialize {
                        listener: self.name().to_owned(),
                        source,
                    }),
                    Err(payload) => Err(self.panicked(Stage::Initialize, payload)),
                }
            })
            .await
            .map(|_| ())
    }

    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        self.ensure_initialized().await?;
        match AssertUnwindSafe(self.listener.send_dyn(message))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DeliveryError::Send {
                listener: self.name().to_owned(),
                message_id: message.id().to_owned(),
                source,
            }),
            Err(payload) => Err(self.panicked(Stage::Send, payload)),
        }
    }

    fn panicked(&self, stage: Stage, payload: Box<dyn Any + Send>) -> DeliveryError {
        DeliveryError::Panicked {
            listener: self.name().to_owned(),
            stage,
            payload: panic_message(payload.as_ref()),
        }
    }
}

/// Hand a failure to the sink, containing a panicking sink.
fn report(sink: &dyn FailureSink, failure: DeliveryError) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink.report(failure))) {
        tracing::error!(
            panic = panic_message(payload.as_ref()),
            "failure sink panicked"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Counts outstanding delivery tasks.
pub(crate) struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        InFlightGuard(Arc::clone(self))
    }

    pub(crate) fn current(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub(crate) async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            let mut notified = std::pin::pin!(notified);
            // Register before checking so a concurrent last exit is not missed.
            notified.as_mut().enable();
            if self.current() == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// The frozen listener set and everything needed to run deliveries.
pub(crate) struct Fanout {
    listeners: Vec<Arc<ListenerSlot>>,
    sink: Arc<dyn FailureSink>,
    runtime: Handle,
    in_flight: Arc<InFlight>,
}

impl Fanout {
    pub(crate) fn new(
        listeners: Vec<Arc<ListenerSlot>>,
        sink: Arc<dyn FailureSink>,
        runtime: Handle,
    ) -> Self {
        Self {
            listeners,
            sink,
            runtime,
            in_flight: Arc::new(InFlight::new()),
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Deliver one message to every listener, one task per listener.
    pub(crate) fn deliver(&self, message: Arc<Message>) {
        for slot in &self.listeners {
            let slot = Arc::clone(slot);
            let sink = Arc::clone(&self.sink);
            let message = Arc::clone(&message);
            let guard = self.in_flight.enter();
            let span = tracing::debug_span!(
                "deliver",
                listener = slot.name(),
                message_id = message.id()
            );
            self.runtime.spawn(
                async move {
                    let _guard = guard;
                    if let Err(failure) = slot.deliver(&message).await {
                        report(sink.as_ref(), failure);
                    }
                }
                .instrument(span),
            );
        }
    }

    /// Deliver a batch in order, one task per listener walking the batch.
    ///
    /// Must be called with the gate lock held so flushes are queued in the
    /// order their batches were drained.
    pub(crate) fn flush(&self, batch: Vec<Arc<Message>>) {
        if batch.is_empty() {
            return;
        }
        let batch: Arc<[Arc<Message>]> = batch.into();
        for slot in &self.listeners {
            let slot = Arc::clone(slot);
            let sink = Arc::clone(&self.sink);
            let batch = Arc::clone(&batch);
            let guard = self.in_flight.enter();
            let (previous, done) = slot.enqueue_flush();
            let span = tracing::debug_span!("flush", listener = slot.name(), size = batch.len());
            self.runtime.spawn(
                async move {
                    let _guard = guard;
                    let _done = done;
                    if let Some(previous) = previous {
                        // Err only means the previous flush task is gone.
                        let _ = previous.await;
                    }
                    for message in batch.iter() {
                        if let Err(failure) = slot.deliver(message).await {
                            report(sink.as_ref(), failure);
                        }
                    }
                }
                .instrument(span),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{BoxError, Listener};
    use std::sync::Mutex;

    struct Flaky {
        init_calls: AtomicUsize,
        fail_first_init: bool,
    }

    impl Listener for Flaky {
        async fn initialize(&self) -> Result<(), BoxError> {
            let call = self.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first_init && call == 0 {
                return Err("not ready".into());
            }
            Ok(())
        }

        async fn send(&self, message: &Message) -> Result<(), BoxError> {
            if message.id() == "bad" {
                return Err("rejected".into());
            }
            Ok(())
        }
    }

    struct Panicky;

    impl Listener for Panicky {
        async fn send(&self, _message: &Message) -> Result<(), BoxError> {
            panic!("listener exploded");
        }
    }

    fn slot<L: Listener>(listener: L) -> ListenerSlot {
        ListenerSlot::new(Arc::new(listener))
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let flaky = Arc::new(Flaky {
            init_calls: AtomicUsize::new(0),
            fail_first_init: false,
        });
        let slot = ListenerSlot::new(flaky.clone());

        slot.deliver(&Message::new("a")).await.unwrap();
        slot.deliver(&Message::new("b")).await.unwrap();
        assert_eq!(flaky.init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_initialize_is_retried() {
        let flaky = Arc::new(Flaky {
            init_calls: AtomicUsize::new(0),
            fail_first_init: true,
        });
        let slot = ListenerSlot::new(flaky.clone());

        let err = slot.deliver(&Message::new("a")).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Initialize);
        assert_eq!(err.original().unwrap().to_string(), "not ready");

        slot.deliver(&Message::new("b")).await.unwrap();
        assert_eq!(flaky.init_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_send_error_keeps_message_id() {
        let slot = slot(Flaky {
            init_calls: AtomicUsize::new(0),
            fail_first_init: false,
        });
        match slot.deliver(&Message::new("bad")).await {
            Err(DeliveryError::Send {
                message_id, source, ..
            }) => {
                assert_eq!(message_id, "bad");
                assert_eq!(source.to_string(), "rejected");
            }
            other => panic!("expected send failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let slot = slot(Panicky);
        match slot.deliver(&Message::new("evt")).await {
            Err(DeliveryError::Panicked { stage, payload, .. }) => {
                assert_eq!(stage, Stage::Send);
                assert_eq!(payload, "listener exploded");
            }
            other => panic!("expected panic failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fanout_reports_and_goes_idle() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let collected = failures.clone();
        let sink: Arc<dyn FailureSink> = Arc::new(move |failure: DeliveryError| {
            collected.lock().unwrap().push(failure.listener().to_owned());
        });
        let fanout = Fanout::new(
            vec![
                Arc::new(slot(Panicky)),
                Arc::new(slot(Flaky {
                    init_calls: AtomicUsize::new(0),
                    fail_first_init: false,
                })),
            ],
            sink,
            Handle::current(),
        );

        fanout.deliver(Arc::new(Message::new("evt")));
        fanout.in_flight().wait_idle().await;

        assert_eq!(fanout.in_flight().current(), 0);
        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].ends_with("Panicky"));
    }

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_when_idle() {
        let in_flight = InFlight::new();
        in_flight.wait_idle().await;
        assert_eq!(in_flight.current(), 0);
    }
}
