//! Participant directory
//!
//! Tracks the users known to the chat, keyed by id. Ids are unique: adding
//! an id twice is an error, unlike broker registration which replaces.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::broker::shutdown::Shutdown;
use crate::users::user::User;
use crate::utils::error::UserError;

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<String, User>>,
    shutdown: Shutdown,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory that refuses new users once `shutdown` has fired.
    pub fn with_shutdown(shutdown: Shutdown) -> Self {
        Self {
            users: RwLock::default(),
            shutdown,
        }
    }

    pub fn add(&self, user: User) -> Result<(), UserError> {
        if self.shutdown.is_triggered() {
            return Err(UserError::Cancelled);
        }
        user.validate()?;

        let mut users = self.write();
        if users.contains_key(&user.id) {
            return Err(UserError::AlreadyExists(user.id));
        }
        debug!(user = %user.id, "user added");
        users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<User, UserError> {
        let removed = self
            .write()
            .remove(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        debug!(user = %id, "user removed");
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Result<User, UserError> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| UserError::NotFound(id.to_string()))
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

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, User>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, User>> {
        self.users.write().unwrap_or_else(PoisonError::into_inner)
    }
}
