//! Row mapping between SQLite rows and `dolist-types` models.
//!
//! Every query selects the columns in the order of the matching `*_COLUMNS`
//! constant, so the mappers can read by index.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

use dolist_types::models::{DatabaseNotification, List, Namespace, Task, User};
use dolist_types::rights::{Grant, ResourceKind, Right, Subject};

pub const USER_COLUMNS: &str = "users.id, users.username, users.email, users.created, users.updated";
pub const NAMESPACE_COLUMNS: &str = "namespaces.id, namespaces.title, namespaces.description, namespaces.owner_id, namespaces.created, namespaces.updated";
pub const LIST_COLUMNS: &str = "lists.id, lists.title, lists.description, lists.namespace_id, lists.owner_id, lists.created, lists.updated";
pub const TASK_COLUMNS: &str = "tasks.id, tasks.text, tasks.description, tasks.done, tasks.due_date, tasks.reminder, tasks.list_id, tasks.created_by_id, tasks.created, tasks.updated";
pub const GRANT_COLUMNS: &str = "rights.id, rights.subject_kind, rights.subject_id, rights.resource_kind, rights.resource_id, rights.level, rights.created, rights.updated";
pub const NOTIFICATION_COLUMNS: &str = "notifications.id, notifications.notifiable_id, notifications.name, notifications.subject_id, notifications.notification, notifications.created";

/// Parses a timestamp written either by the application (RFC 3339) or by
/// SQLite's `datetime('now')` ("YYYY-MM-DD HH:MM:SS", implicitly UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[derive(Debug, thiserror::Error)]
#[error("unparseable timestamp '{0}'")]
struct BadTimestamp(String);

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).ok_or_else(|| conversion_error(idx, BadTimestamp(raw)))
}

fn optional_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| parse_timestamp(&raw).ok_or_else(|| conversion_error(idx, BadTimestamp(raw))))
        .transpose()
}

pub fn right(row: &Row, idx: usize) -> rusqlite::Result<Right> {
    let level: i64 = row.get(idx)?;
    Right::try_from(level).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e))
    })
}

pub fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created: timestamp(row, 3)?,
        updated: timestamp(row, 4)?,
    })
}

pub fn namespace_from_row(row: &Row) -> rusqlite::Result<Namespace> {
    Ok(Namespace {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        created: timestamp(row, 4)?,
        updated: timestamp(row, 5)?,
    })
}

pub fn list_from_row(row: &Row) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        namespace_id: row.get(3)?,
        owner_id: row.get(4)?,
        created: timestamp(row, 5)?,
        updated: timestamp(row, 6)?,
    })
}

pub fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        text: row.get(1)?,
        description: row.get(2)?,
        done: row.get(3)?,
        due_date: optional_timestamp(row, 4)?,
        reminder: optional_timestamp(row, 5)?,
        list_id: row.get(6)?,
        created_by_id: row.get(7)?,
        created: timestamp(row, 8)?,
        updated: timestamp(row, 9)?,
    })
}

pub fn grant_from_row(row: &Row) -> rusqlite::Result<Grant> {
    let subject_kind: String = row.get(1)?;
    let subject = Subject::from_parts(&subject_kind, row.get(2)?)
        .map_err(|e| conversion_error(1, e))?;
    let resource_kind: String = row.get(3)?;
    let target = resource_kind
        .parse::<ResourceKind>()
        .map_err(|e| conversion_error(3, e))?
        .target(row.get(4)?);

    Ok(Grant {
        id: row.get(0)?,
        subject,
        target,
        right: right(row, 5)?,
        created: timestamp(row, 6)?,
        updated: timestamp(row, 7)?,
    })
}

pub fn notification_from_row(row: &Row) -> rusqlite::Result<DatabaseNotification> {
    let payload: String = row.get(4)?;
    let notification = serde_json::from_str(&payload).map_err(|e| conversion_error(4, e))?;

    Ok(DatabaseNotification {
        id: row.get(0)?,
        notifiable_id: row.get(1)?,
        name: row.get(2)?,
        subject_id: row.get(3)?,
        notification,
        created: timestamp(row, 5)?,
    })
}
