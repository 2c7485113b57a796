//! The `service` module wires the broker, the user directory and the
//! message history into the operations a network transport would expose.

pub mod chat;

pub use chat::ChatService;

#[cfg(test)]
mod tests;
