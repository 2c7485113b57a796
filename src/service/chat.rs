//! Chat service
//!
//! The entry points a transport calls per connection: `join` on connect,
//! `send` per inbound message, `leave` on disconnect. It validates through
//! the user directory, records through the message store and routes through
//! the broker.
//!
//! The service owns each joined user's delivery channel: the broker only
//! borrows a sender for routing, and `leave` is what closes the inbox.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::broker::{Broker, Message};
use crate::history::MessageStore;
use crate::users::{User, UserDirectory};
use crate::utils::error::{ChatResult, UserError};

#[derive(Debug)]
pub struct ChatService {
    broker: Arc<Broker>,
    users: UserDirectory,
    history: MessageStore,
    subscriber_buffer: usize,
    inboxes: Mutex<HashMap<String, mpsc::Sender<Message>>>,
}

impl ChatService {
    pub fn new(
        broker: Arc<Broker>,
        users: UserDirectory,
        history: MessageStore,
        subscriber_buffer: usize,
    ) -> Self {
        Self {
            broker,
            users,
            history,
            subscriber_buffer: subscriber_buffer.max(1),
            inboxes: Mutex::default(),
        }
    }

    /// Add `user` to the directory and open a delivery channel for it.
    ///
    /// The returned receiver is the user's inbox; dropping it makes further
    /// deliveries to this user fail silently until `leave` is called.
    pub fn join(&self, user: User) -> ChatResult<mpsc::Receiver<Message>> {
        let id = user.id.clone();
        self.users.add(user)?;

        let (tx, rx) = mpsc::channel(self.subscriber_buffer);
        self.inboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), tx.clone());
        self.broker.register_user(id.clone(), tx);
        info!(user = %id, "user joined");
        Ok(rx)
    }

    /// Stop routing to the user, close its inbox and remove it from the
    /// directory. Messages already in the inbox can still be received.
    pub fn leave(&self, id: &str) -> ChatResult<User> {
        self.broker.unregister_user(id);
        self.inboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        let user = self.users.remove(id)?;
        info!(user = %id, "user left");
        Ok(user)
    }

    /// Validate, route and record a message from a joined user.
    ///
    /// The message is recorded only once the broker has accepted it.
    pub async fn send(&self, message: Message) -> ChatResult<()> {
        MessageStore::validate(&message)?;
        if !self.users.contains(&message.sender) {
            return Err(UserError::NotFound(message.sender).into());
        }

        if let Err(e) = self.broker.publish(message.clone()).await {
            warn!(sender = %message.sender, "message rejected: {e}");
            return Err(e.into());
        }
        self.history.append(message)?;
        Ok(())
    }

    pub fn history(&self, sender: Option<&str>) -> Vec<Message> {
        self.history.list(sender)
    }

    pub fn broker(&self) -> &Arc<Broker> {
        &self.broker
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }
}
