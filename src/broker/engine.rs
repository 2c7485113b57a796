//! Broker engine
//!
//! `Broker` wraps the ingestion queue, the subscriber registry and the
//! lifecycle of the dispatch loop behind one `&self` API, so it is shared
//! as `Arc<Broker>` between producers, registrants and the dispatch task.
//!
//! Lifecycle: `Created -> Running -> Stopped`. `run` starts the loop at most
//! once; a second call is an error rather than a second loop. The broker is
//! `Stopped` as soon as either `stop` is called or the external cancellation
//! signal fires, and it never leaves that state.
//!
//! Backpressure: the ingestion queue is bounded, so `publish` waits while it
//! is full. Subscriber channels never push back on the loop; a full
//! subscriber simply misses the message.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::broker::dispatch::Dispatcher;
use crate::broker::message::Message;
use crate::broker::registry::{Registry, SubscriberId};
use crate::broker::shutdown::Shutdown;
use crate::utils::error::{BrokerError, BrokerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    Created,
    Running,
    Stopped,
}

#[derive(Debug)]
struct Lifecycle {
    state: BrokerState,
    inbox: Option<mpsc::Receiver<Message>>,
    task: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct Broker {
    queue: mpsc::Sender<Message>,
    registry: Arc<Registry>,
    shutdown: Shutdown,
    done: Shutdown,
    lifecycle: Mutex<Lifecycle>,
}

impl Broker {
    /// Capacity of the ingestion queue when none is configured.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

    /// Create a broker bound to an external cancellation signal.
    /// The dispatch loop is not started until `run`.
    pub fn new(shutdown: Shutdown) -> Self {
        Self::with_capacity(shutdown, Self::DEFAULT_QUEUE_CAPACITY)
    }

    /// Like `new`, with an explicit ingestion queue capacity (at least 1).
    pub fn with_capacity(shutdown: Shutdown, capacity: usize) -> Self {
        let (queue, inbox) = mpsc::channel(capacity.max(1));
        Self {
            queue,
            registry: Arc::new(Registry::new()),
            shutdown,
            done: Shutdown::new(),
            lifecycle: Mutex::new(Lifecycle {
                state: BrokerState::Created,
                inbox: Some(inbox),
                task: None,
            }),
        }
    }

    /// Spawn the dispatch loop on the current tokio runtime.
    ///
    /// Fails with `AlreadyRunning` if the loop was started before, with
    /// `Stopped` once the broker has been stopped or cancelled, and with
    /// `NoRuntime` when called outside a tokio runtime. Only the first
    /// successful call changes the state.
    pub fn run(&self) -> BrokerResult<()> {
        let mut lifecycle = self.lifecycle();
        match self.observed_state(&lifecycle) {
            BrokerState::Running => return Err(BrokerError::AlreadyRunning),
            BrokerState::Stopped => return Err(BrokerError::Stopped),
            BrokerState::Created => {}
        }
        let runtime = Handle::try_current().map_err(|_| BrokerError::NoRuntime)?;
        let Some(inbox) = lifecycle.inbox.take() else {
            return Err(BrokerError::Stopped);
        };

        let dispatcher = Dispatcher::new(
            inbox,
            self.registry.clone(),
            self.shutdown.listen(),
            self.done.listen(),
        );
        lifecycle.task = Some(runtime.spawn(dispatcher.run()));
        lifecycle.state = BrokerState::Running;
        info!(capacity = self.queue.max_capacity(), "dispatch loop started");
        Ok(())
    }

    /// Queue `msg` for dispatch, waiting while the queue is full.
    ///
    /// Returns `ShuttingDown` if the cancellation signal has fired and
    /// `Closed` if the broker was stopped, in both cases without queueing.
    /// An `Ok` means the message was accepted; routing outcomes are never
    /// reported back.
    pub async fn publish(&self, msg: Message) -> BrokerResult<()> {
        if self.shutdown.is_triggered() {
            return Err(BrokerError::ShuttingDown);
        }
        if self.done.is_triggered() {
            return Err(BrokerError::Closed);
        }

        // Only a full queue needs to wait alongside the signals.
        let msg = match self.queue.try_send(msg) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Closed(_)) => return Err(self.closed_reason()),
            Err(TrySendError::Full(msg)) => msg,
        };

        tokio::select! {
            biased;
            _ = self.shutdown.triggered() => Err(BrokerError::ShuttingDown),
            _ = self.done.triggered() => Err(BrokerError::Closed),
            sent = self.queue.send(msg) => sent.map_err(|_| self.closed_reason()),
        }
    }

    /// Register (or replace) the delivery channel for `id`.
    pub fn register_user(&self, id: impl Into<SubscriberId>, channel: mpsc::Sender<Message>) {
        self.registry.register(id, channel);
    }

    /// Drop the delivery channel for `id`. Unknown ids are ignored.
    pub fn unregister_user(&self, id: &str) {
        self.registry.unregister(id);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Messages accepted but not yet taken by the dispatch loop.
    pub fn queued_len(&self) -> usize {
        self.queue.max_capacity() - self.queue.capacity()
    }

    /// Stop the dispatch loop. Safe to call any number of times.
    pub fn stop(&self) {
        self.done.trigger();
        let mut lifecycle = self.lifecycle();
        if lifecycle.state != BrokerState::Stopped {
            info!("broker stopped");
        }
        lifecycle.state = BrokerState::Stopped;
        lifecycle.inbox.take();
    }

    pub fn state(&self) -> BrokerState {
        self.observed_state(&self.lifecycle())
    }

    /// Wait for the dispatch task to finish. Returns at once if it was never
    /// started or has already been joined.
    pub async fn join(&self) {
        let task = self.lifecycle().task.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("dispatch loop terminated abnormally: {e}");
            } else {
                debug!("dispatch loop joined");
            }
        }
    }

    fn observed_state(&self, lifecycle: &Lifecycle) -> BrokerState {
        if self.shutdown.is_triggered() || self.done.is_triggered() {
            BrokerState::Stopped
        } else {
            lifecycle.state
        }
    }

    fn closed_reason(&self) -> BrokerError {
        if self.shutdown.is_triggered() {
            BrokerError::ShuttingDown
        } else {
            BrokerError::Closed
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
