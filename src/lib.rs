//! # chatcore
//!
//! `chatcore` is an in-process chat message broker built on tokio. Producers
//! publish onto one bounded ingestion queue; a single dispatch loop routes
//! each message either to one named subscriber or to every subscriber, never
//! waiting on a slow one.
//!
//! ## Core Modules
//!
//! - `broker`: the `Broker` facade, subscriber registry, dispatch loop and cancellation signal.
//! - `users`: participant validation and the user directory.
//! - `history`: in-memory record of routed messages.
//! - `service`: `ChatService`, the join/send/leave surface a transport calls.
//! - `config`: layered settings from file and environment.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod config;
pub mod history;
pub mod service;
pub mod users;
pub mod utils;
