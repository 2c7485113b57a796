//! The `history` module keeps the messages that passed through the chat.
//!
//! Storage is in-memory only; nothing survives a restart.

pub mod store;

pub use store::MessageStore;
