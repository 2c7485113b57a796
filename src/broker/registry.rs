//! Subscriber registry
//!
//! Maps a subscriber identity to the sending half of that subscriber's
//! delivery channel. The receiving half belongs to the subscriber; the
//! registry only keeps a handle for routing and never closes it.
//!
//! Concurrency contract:
//! - `route_to_one` / `route_to_all` take the read lock and may run
//!   concurrently with each other.
//! - `register` / `unregister` take the write lock and exclude every other
//!   access. A write that returns before a route call starts is visible to it.
//! - Routing never awaits: sends use `try_send` and a full or closed channel
//!   drops the message for that subscriber only.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

use crate::broker::message::Message;

pub type SubscriberId = String;

#[derive(Debug, Default)]
pub struct Registry {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Message>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the channel for `id`.
    ///
    /// Returns `true` when an existing entry was replaced. The replaced
    /// sender is dropped here, which only closes the old channel if nobody
    /// else holds a sender for it.
    pub fn register(&self, id: impl Into<SubscriberId>, channel: mpsc::Sender<Message>) -> bool {
        let id = id.into();
        let replaced = self.write().insert(id.clone(), channel).is_some();
        debug!(subscriber = %id, replaced, "registered subscriber");
        replaced
    }

    /// Remove `id` if present. Unknown ids are ignored.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.write().remove(id).is_some();
        debug!(subscriber = %id, removed, "unregistered subscriber");
        removed
    }

    /// Deliver `msg` to `id` without waiting. Returns whether it was accepted.
    pub fn route_to_one(&self, id: &str, msg: Message) -> bool {
        let subscribers = self.read();
        match subscribers.get(id) {
            Some(channel) => offer(id, channel, msg),
            None => {
                trace!(recipient = %id, "no subscriber registered, message discarded");
                false
            }
        }
    }

    /// Deliver `msg` to every registered subscriber without waiting.
    /// Returns how many subscribers accepted it.
    pub fn route_to_all(&self, msg: &Message) -> usize {
        let subscribers = self.read();
        subscribers
            .iter()
            .filter(|(id, channel)| offer(id, channel, msg.clone()))
            .count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Routing never panics while holding a guard, so a poisoned lock still
    // holds a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SubscriberId, mpsc::Sender<Message>>> {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SubscriberId, mpsc::Sender<Message>>> {
        self.subscribers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn offer(id: &str, channel: &mpsc::Sender<Message>, msg: Message) -> bool {
    match channel.try_send(msg) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            trace!(subscriber = %id, "subscriber channel full, message dropped");
            false
        }
        Err(TrySendError::Closed(_)) => {
            trace!(subscriber = %id, "subscriber channel closed, message dropped");
            false
        }
    }
}
