//! Error taxonomy for domain operations.

use thiserror::Error;

use dolist_types::rights::InvalidRight;

use crate::hierarchy::Resource;
use crate::notifications::TransportError;
use crate::permissions::Action;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: String },

    #[error("Not allowed to {action} {resource}")]
    Forbidden { action: Action, resource: Resource },

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Wrong username or password")]
    InvalidCredentials,

    #[error("Mail delivery failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(err.into())
    }
}

impl From<InvalidRight> for Error {
    fn from(err: InvalidRight) -> Self {
        Self::validation("right", err.to_string())
    }
}

/// Rejects empty or whitespace-only values.
pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(())
}
