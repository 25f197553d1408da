//! Right associations between subjects and shareable resources.
//!
//! The registry functions take a bare connection and trust their caller. The
//! `share`/`unshare`/`read_*` services on top of them enforce the doer's rights.

use rusqlite::Connection;
use tracing::{info, warn};

use dolist_db::{rights, teams, users};
use dolist_types::events::Notification;
use dolist_types::pagination::{Page, PaginatedResult};
use dolist_types::rights::{Grant, Right, ShareTarget, Subject, TeamWithRight, UserWithRight};

use crate::context::Ctx;
use crate::error::{Error, Result};
use crate::hierarchy::{load_list, load_namespace};
use crate::permissions::{Action, check};

// -- Registry --

/// Grants `right` to `subject` on `target`, replacing any earlier right for the
/// same pair.
pub fn grant(conn: &Connection, subject: Subject, target: ShareTarget, right: Right) -> Result<Grant> {
    ensure_subject(conn, subject)?;
    ensure_target(conn, target)?;

    rights::upsert(conn, subject, target, right)?;
    info!("Granted {} on {} to {}", right, target, subject);

    rights::get(conn, subject, target)?.ok_or_else(|| Error::not_found("grant", format!("{subject} on {target}")))
}

pub fn revoke(conn: &Connection, subject: Subject, target: ShareTarget) -> Result<()> {
    if rights::delete(conn, subject, target)? == 0 {
        return Err(Error::not_found("grant", format!("{subject} on {target}")));
    }
    info!("Revoked rights of {} on {}", subject, target);
    Ok(())
}

/// Every grant on `target`, oldest first.
pub fn list_grants(conn: &Connection, target: ShareTarget) -> Result<Vec<Grant>> {
    Ok(rights::for_target(conn, target)?)
}

pub fn list_grants_for_subject(
    conn: &Connection,
    subject: Subject,
    page: Page,
) -> Result<PaginatedResult<Grant>> {
    let (items, total) = rights::for_subject(conn, subject, page)?;
    Ok(PaginatedResult { items, total, page })
}

/// Users holding a direct grant on `target`. Team-derived access is not listed.
pub fn users_with_access(
    conn: &Connection,
    target: ShareTarget,
    search: &str,
    page: Page,
) -> Result<Vec<UserWithRight>> {
    let rows = rights::users_with_access(conn, target, search, page)?;
    Ok(rows
        .into_iter()
        .map(|(user, right)| UserWithRight { user, right })
        .collect())
}

pub fn teams_with_access(
    conn: &Connection,
    target: ShareTarget,
    search: &str,
    page: Page,
) -> Result<Vec<TeamWithRight>> {
    let rows = rights::teams_with_access(conn, target, search, page)?;
    Ok(rows
        .into_iter()
        .map(|(team, right)| TeamWithRight { team, right })
        .collect())
}

fn ensure_subject(conn: &Connection, subject: Subject) -> Result<()> {
    let exists = match subject {
        Subject::User(id) => users::get_by_id(conn, id)?.is_some(),
        Subject::Team(id) => teams::exists(conn, id)?,
    };
    if !exists {
        return Err(Error::not_found(subject.kind(), subject.id()));
    }
    Ok(())
}

fn ensure_target(conn: &Connection, target: ShareTarget) -> Result<()> {
    match target {
        ShareTarget::Namespace(id) => load_namespace(conn, id).map(|_| ()),
        ShareTarget::List(id) => load_list(conn, id).map(|_| ()),
    }
}

// -- Services --

/// Shares `target` with `subject`. The doer needs admin rights on the target.
///
/// A user subject other than the doer is notified. Any failure while building
/// or delivering that notification is logged; the grant stays in place.
pub fn share(ctx: &Ctx, subject: Subject, target: ShareTarget, right: Right) -> Result<Grant> {
    ensure_target(ctx.conn, target)?;
    check(ctx.conn, ctx.doer, target.into(), Action::Share)?;

    let grant = grant(ctx.conn, subject, target, right)?;

    match subject {
        Subject::User(user_id) if user_id != ctx.doer.id => {
            if let Err(e) = notify_shared(ctx, user_id, target, right) {
                warn!("Could not notify user {} about {}: {}", user_id, target, e);
            }
        }
        _ => {}
    }

    Ok(grant)
}

pub fn unshare(ctx: &Ctx, subject: Subject, target: ShareTarget) -> Result<()> {
    ensure_target(ctx.conn, target)?;
    check(ctx.conn, ctx.doer, target.into(), Action::Share)?;

    revoke(ctx.conn, subject, target)
}

pub fn read_users(
    ctx: &Ctx,
    target: ShareTarget,
    search: &str,
    page: Page,
) -> Result<Vec<UserWithRight>> {
    ensure_target(ctx.conn, target)?;
    check(ctx.conn, ctx.doer, target.into(), Action::Read)?;

    users_with_access(ctx.conn, target, search, page)
}

pub fn read_teams(
    ctx: &Ctx,
    target: ShareTarget,
    search: &str,
    page: Page,
) -> Result<Vec<TeamWithRight>> {
    ensure_target(ctx.conn, target)?;
    check(ctx.conn, ctx.doer, target.into(), Action::Read)?;

    teams_with_access(ctx.conn, target, search, page)
}

fn notify_shared(ctx: &Ctx, user_id: i64, target: ShareTarget, right: Right) -> Result<()> {
    let Some(user) = users::get_by_id(ctx.conn, user_id)? else {
        return Ok(());
    };

    let doer = ctx.doer.username.clone();
    let notification = match target {
        ShareTarget::Namespace(id) => Notification::NamespaceShared {
            namespace_id: id,
            namespace_title: load_namespace(ctx.conn, id)?.title,
            doer,
            right,
        },
        ShareTarget::List(id) => Notification::ListShared {
            list_id: id,
            list_title: load_list(ctx.conn, id)?.title,
            doer,
            right,
        },
    };

    ctx.notifier.notify(ctx.conn, &user, &notification)?;
    Ok(())
}
