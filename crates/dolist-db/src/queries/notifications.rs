use anyhow::Result;
use rusqlite::Connection;

use dolist_types::models::DatabaseNotification;
use dolist_types::pagination::Page;

use crate::models::{NOTIFICATION_COLUMNS, notification_from_row};

/// Appends a notification row. `payload` is stored as-is.
pub fn insert(
    conn: &Connection,
    notifiable_id: i64,
    name: &str,
    subject_id: Option<i64>,
    payload: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO notifications (notifiable_id, name, subject_id, notification)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![notifiable_id, name, subject_id, payload],
    )?;
    Ok(conn.last_insert_rowid())
}

/// A user's feed, newest first.
pub fn for_notifiable(
    conn: &Connection,
    notifiable_id: i64,
    page: Page,
) -> Result<(Vec<DatabaseNotification>, u64)> {
    let total = count_for_notifiable(conn, notifiable_id)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications
         WHERE notifiable_id = ?1
         ORDER BY notifications.id DESC LIMIT ?2 OFFSET ?3"
    ))?;

    let rows = stmt
        .query_map(
            rusqlite::params![notifiable_id, page.limit(), page.offset()],
            notification_from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((rows, total))
}

pub fn count_for_notifiable(conn: &Connection, notifiable_id: i64) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE notifiable_id = ?1",
        [notifiable_id],
        |r| r.get(0),
    )?;
    Ok(n as u64)
}
