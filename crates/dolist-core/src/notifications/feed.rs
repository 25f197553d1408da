use rusqlite::Connection;

use dolist_db::notifications;
use dolist_types::models::{DatabaseNotification, User};
use dolist_types::pagination::{Page, PaginatedResult};

use crate::error::Result;

/// The user's persisted notifications, newest first.
pub fn read_all(
    conn: &Connection,
    user: &User,
    page: Page,
) -> Result<PaginatedResult<DatabaseNotification>> {
    let (items, total) = notifications::for_notifiable(conn, user.id, page)?;
    Ok(PaginatedResult { items, total, page })
}
