//! Dispatch loop
//!
//! The single consumer of the ingestion queue. Each iteration waits for the
//! first of: external cancellation, explicit stop, or the next queued
//! message. Signals win over pending messages; whatever is still queued when
//! a signal arrives is dropped with the queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, trace};

use crate::broker::message::Message;
use crate::broker::registry::Registry;
use crate::broker::shutdown::ShutdownListener;

#[derive(Debug)]
pub(crate) struct Dispatcher {
    inbox: mpsc::Receiver<Message>,
    registry: Arc<Registry>,
    shutdown: ShutdownListener,
    done: ShutdownListener,
}

impl Dispatcher {
    pub(crate) fn new(
        inbox: mpsc::Receiver<Message>,
        registry: Arc<Registry>,
        shutdown: ShutdownListener,
        done: ShutdownListener,
    ) -> Self {
        Self {
            inbox,
            registry,
            shutdown,
            done,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.triggered() => {
                    info!("cancellation received, dispatch loop exiting");
                    break;
                }
                _ = self.done.triggered() => {
                    info!("broker stopped, dispatch loop exiting");
                    break;
                }
                next = self.inbox.recv() => match next {
                    Some(msg) => dispatch(&self.registry, msg),
                    None => break,
                },
            }
        }
        // Dropping `self.inbox` here closes the queue for any blocked publisher.
    }
}

/// Stamp an unset timestamp, then route by delivery mode.
pub(crate) fn dispatch(registry: &Registry, mut msg: Message) {
    if msg.timestamp == 0 {
        msg.timestamp = chrono::Utc::now().timestamp();
    }

    if msg.broadcast {
        let delivered = registry.route_to_all(&msg);
        trace!(sender = %msg.sender, delivered, "broadcast dispatched");
    } else {
        let recipient = msg.recipient.clone();
        let delivered = registry.route_to_one(&recipient, msg);
        trace!(recipient = %recipient, delivered, "direct message dispatched");
    }
}
