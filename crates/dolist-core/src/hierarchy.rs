//! Effective right resolution along the namespace → list → task chain.
//!
//! Nothing here is cached: every call re-reads ownership, grants and team
//! memberships, so a grant change is visible to the very next check.

use std::fmt;

use rusqlite::Connection;
use tracing::debug;

use dolist_db::{lists, namespaces, rights, tasks, teams};
use dolist_types::models::{List, Namespace, User};
use dolist_types::rights::{Right, ShareTarget};

use crate::error::{Error, Result};

/// Anything a permission can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Team(i64),
    Namespace(i64),
    List(i64),
    Task(i64),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team(id) => write!(f, "team {id}"),
            Self::Namespace(id) => write!(f, "namespace {id}"),
            Self::List(id) => write!(f, "list {id}"),
            Self::Task(id) => write!(f, "task {id}"),
        }
    }
}

impl From<ShareTarget> for Resource {
    fn from(target: ShareTarget) -> Self {
        match target {
            ShareTarget::Namespace(id) => Self::Namespace(id),
            ShareTarget::List(id) => Self::List(id),
        }
    }
}

/// The highest right `user` holds on `resource`, or `None` for no access.
///
/// Fails with `NotFound` when the resource (or a parent in its chain) does not
/// exist.
pub fn effective_right(conn: &Connection, user: &User, resource: Resource) -> Result<Option<Right>> {
    let right = match resource {
        Resource::Team(id) => team_right(conn, user, id)?,
        Resource::Namespace(id) => {
            let namespace = load_namespace(conn, id)?;
            namespace_right(conn, user, &namespace)?
        }
        Resource::List(id) => {
            let list = load_list(conn, id)?;
            list_right(conn, user, &list)?
        }
        // Tasks carry no grants of their own.
        Resource::Task(id) => {
            let task = tasks::get(conn, id)?.ok_or_else(|| Error::not_found("task", id))?;
            let list = load_list(conn, task.list_id)?;
            list_right(conn, user, &list)?
        }
    };

    debug!("User {} has {:?} on {}", user.id, right, resource);
    Ok(right)
}

fn team_right(conn: &Connection, user: &User, team_id: i64) -> Result<Option<Right>> {
    if !teams::exists(conn, team_id)? {
        return Err(Error::not_found("team", team_id));
    }

    Ok(teams::membership(conn, team_id, user.id)?.map(|admin| {
        if admin { Right::Admin } else { Right::Read }
    }))
}

fn namespace_right(conn: &Connection, user: &User, namespace: &Namespace) -> Result<Option<Right>> {
    if namespace.owner_id == user.id {
        return Ok(Some(Right::Admin));
    }
    granted(conn, user, ShareTarget::Namespace(namespace.id))
}

fn list_right(conn: &Connection, user: &User, list: &List) -> Result<Option<Right>> {
    if list.owner_id == user.id {
        return Ok(Some(Right::Admin));
    }

    let on_list = granted(conn, user, ShareTarget::List(list.id))?;
    if on_list == Some(Right::Admin) {
        return Ok(on_list);
    }

    let namespace = load_namespace(conn, list.namespace_id)?;
    let on_namespace = namespace_right(conn, user, &namespace)?;

    // A weaker grant on the list never masks a stronger one on the namespace.
    Ok(on_list.max(on_namespace))
}

/// Direct user grant first, then the best grant of any team the user is in.
fn granted(conn: &Connection, user: &User, target: ShareTarget) -> Result<Option<Right>> {
    let direct = rights::user_grant(conn, user.id, target)?;
    if direct == Some(Right::Admin) {
        return Ok(direct);
    }

    let via_team = rights::best_team_grant(conn, user.id, target)?;
    Ok(direct.max(via_team))
}

pub(crate) fn load_namespace(conn: &Connection, id: i64) -> Result<Namespace> {
    namespaces::get(conn, id)?.ok_or_else(|| Error::not_found("namespace", id))
}

pub(crate) fn load_list(conn: &Connection, id: i64) -> Result<List> {
    lists::get(conn, id)?.ok_or_else(|| Error::not_found("list", id))
}
