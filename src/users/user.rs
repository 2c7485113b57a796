use serde::{Deserialize, Serialize};

use crate::utils::error::UserError;

/// A chat participant.
///
/// `id` is the identity the broker routes on; `name` and `email` are only
/// checked for well-formedness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// Create a user with a freshly generated id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: format!("user-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Check id, name and email, in that order.
    pub fn validate(&self) -> Result<(), UserError> {
        if self.id.is_empty() {
            return Err(UserError::MissingId);
        }
        if self.name.is_empty() {
            return Err(UserError::MissingName);
        }
        if !is_valid_email(&self.email) {
            return Err(UserError::InvalidEmail);
        }
        Ok(())
    }
}

/// `local@domain.tld`: local part of `[A-Za-z0-9._%+-]`, domain of
/// `[A-Za-z0-9.-]`, and an alphabetic top-level label of two or more letters.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ".-".contains(c));
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}
