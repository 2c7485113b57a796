//! The `users` module validates and tracks chat participants.
//!
//! The broker never calls into it; a transport layer validates a user here
//! before registering the user's delivery channel with the broker.

pub mod directory;
pub mod user;

pub use directory::UserDirectory;
pub use user::User;
