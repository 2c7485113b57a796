//! The `broker` module routes chat messages between registered subscribers.
//!
//! - `message`: the `Message` record.
//! - `registry`: identity → delivery channel map with non-blocking routing.
//! - `dispatch`: the loop draining the ingestion queue.
//! - `engine`: the `Broker` facade and its lifecycle.
//! - `shutdown`: the cancellation signal shared with the surrounding process.

pub(crate) mod dispatch;
pub mod engine;
pub mod message;
pub mod registry;
pub mod shutdown;

pub use engine::{Broker, BrokerState};
pub use message::Message;
pub use registry::{Registry, SubscriberId};
pub use shutdown::{Shutdown, ShutdownListener};
