//! Capability checks. Each compares the effective right against the level the
//! action needs; none of them write anything.

use std::fmt;

use rusqlite::Connection;
use tracing::{debug, warn};

use dolist_types::models::User;
use dolist_types::rights::Right;

use crate::error::{Error, Result};
use crate::hierarchy::{Resource, effective_right};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    /// Create something inside the resource, which is always a container.
    Create,
    Update,
    Delete,
    Share,
}

impl Action {
    pub fn required_right(self) -> Right {
        match self {
            Self::Read => Right::Read,
            Self::Create | Self::Update | Self::Delete => Right::Write,
            Self::Share => Right::Admin,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Create => "create in",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Share => "share",
        })
    }
}

pub fn can(conn: &Connection, user: &User, resource: Resource, action: Action) -> Result<bool> {
    let right = effective_right(conn, user, resource)?;
    let allowed = right.is_some_and(|r| r >= action.required_right());
    debug!(
        "User {} {} {}: {}",
        user.id,
        action,
        resource,
        if allowed { "allowed" } else { "denied" }
    );
    Ok(allowed)
}

/// Like [`can`], but a denial is a `Forbidden` error.
pub fn check(conn: &Connection, user: &User, resource: Resource, action: Action) -> Result<()> {
    if can(conn, user, resource, action)? {
        return Ok(());
    }

    warn!("User {} may not {} {}", user.id, action, resource);
    Err(Error::Forbidden { action, resource })
}

pub fn can_read(conn: &Connection, user: &User, resource: Resource) -> Result<bool> {
    can(conn, user, resource, Action::Read)
}

pub fn can_create(conn: &Connection, user: &User, parent: Resource) -> Result<bool> {
    can(conn, user, parent, Action::Create)
}

pub fn can_update(conn: &Connection, user: &User, resource: Resource) -> Result<bool> {
    can(conn, user, resource, Action::Update)
}

pub fn can_delete(conn: &Connection, user: &User, resource: Resource) -> Result<bool> {
    can(conn, user, resource, Action::Delete)
}

pub fn can_share(conn: &Connection, user: &User, resource: Resource) -> Result<bool> {
    can(conn, user, resource, Action::Share)
}
