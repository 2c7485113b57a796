use serde::{Deserialize, Serialize};

/// A single chat event routed by the broker.
///
/// A message is either addressed to one `recipient` or, when `broadcast` is
/// set, to every registered subscriber (in which case `recipient` is ignored).
///
/// # Fields
///
/// - `sender` - Identity of the participant that produced the message.
/// - `recipient` - Target identity for direct delivery.
/// - `content` - The message body.
/// - `broadcast` - Route to all subscribers instead of `recipient`.
/// - `timestamp` - Unix timestamp in seconds. `0` means "unset"; the dispatch
///   loop stamps it just before routing.
///
/// # Example
///
/// ```rust
/// use chatcore::broker::message::Message;
///
/// let msg = Message::direct("alice", "bob", "hi");
/// assert!(!msg.broadcast);
/// assert_eq!(msg.timestamp, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    #[serde(default)]
    pub recipient: String,
    pub content: String,
    #[serde(default)]
    pub broadcast: bool,
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    /// A message for a single recipient.
    pub fn direct(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            broadcast: false,
            timestamp: 0,
        }
    }

    /// A message for every registered subscriber.
    pub fn broadcast(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            recipient: String::new(),
            content: content.into(),
            broadcast: true,
            timestamp: 0,
        }
    }
}
