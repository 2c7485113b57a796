//! The `error` module defines the error types used within `chatcore`.
//!
//! Routing misses (unknown recipient, full subscriber channel) are not
//! errors and have no variant here; they are dropped and logged.

use thiserror::Error;

/// Lifecycle errors returned by the broker facade.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    /// The external cancellation signal fired before the message was queued.
    #[error("broker is shutting down")]
    ShuttingDown,

    /// The broker was stopped explicitly before the message was queued.
    #[error("broker has been closed")]
    Closed,

    #[error("dispatch loop is already running")]
    AlreadyRunning,

    #[error("broker has been stopped and cannot be restarted")]
    Stopped,

    #[error("no tokio runtime available to run the dispatch loop")]
    NoRuntime,
}

/// Identity validation and directory errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("missing id")]
    MissingId,

    #[error("missing name")]
    MissingName,

    #[error("invalid email")]
    InvalidEmail,

    #[error("user {0} already exists")]
    AlreadyExists(String),

    #[error("user {0} not found")]
    NotFound(String),

    #[error("cannot add user: directory is shutting down")]
    Cancelled,
}

/// Message history errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("missing sender")]
    MissingSender,

    #[error("missing content")]
    MissingContent,
}

/// Errors surfaced by the chat service, which glues the collaborators together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

pub type BrokerResult<T> = std::result::Result<T, BrokerError>;

pub type ChatResult<T> = std::result::Result<T, ChatError>;
