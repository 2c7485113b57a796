//! In-memory message history
//!
//! Appends validated messages in arrival order and hands out snapshot
//! copies, so readers never hold the lock while they work with the result.

use std::sync::{PoisonError, RwLock};

use tracing::trace;

use crate::broker::message::Message;
use crate::utils::error::HistoryError;

#[derive(Debug)]
pub struct MessageStore {
    messages: RwLock<Vec<Message>>,
}

impl MessageStore {
    /// Initial capacity reserved for the history.
    const INITIAL_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::with_capacity(Self::INITIAL_CAPACITY)),
        }
    }

    /// Store a message. Sender and content must be non-empty.
    pub fn append(&self, message: Message) -> Result<(), HistoryError> {
        Self::validate(&message)?;

        trace!(sender = %message.sender, "message appended to history");
        self.messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }

    /// The checks `append` applies, without storing anything.
    pub fn validate(message: &Message) -> Result<(), HistoryError> {
        if message.sender.is_empty() {
            return Err(HistoryError::MissingSender);
        }
        if message.content.is_empty() {
            return Err(HistoryError::MissingContent);
        }
        Ok(())
    }

    /// All stored messages, or only those from `sender` when given.
    pub fn list(&self, sender: Option<&str>) -> Vec<Message> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        match sender {
            Some(sender) if !sender.is_empty() => messages
                .iter()
                .filter(|m| m.sender == sender)
                .cloned()
                .collect(),
            _ => messages.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
