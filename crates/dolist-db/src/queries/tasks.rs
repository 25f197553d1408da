use anyhow::Result;
use rusqlite::Connection;

use dolist_types::models::Task;
use dolist_types::pagination::Page;

use super::{OptionalExt, contains};
use crate::models::{TASK_COLUMNS, format_timestamp, task_from_row};

pub fn insert(conn: &Connection, task: &Task) -> Result<i64> {
    conn.execute(
        "INSERT INTO tasks (text, description, done, due_date, reminder, list_id, created_by_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            task.text,
            task.description,
            task.done,
            task.due_date.as_ref().map(format_timestamp),
            task.reminder.as_ref().map(format_timestamp),
            task.list_id,
            task.created_by_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Task>> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id],
        task_from_row,
    )
    .optional()
}

/// Writes every mutable column of `task`. The list and creator never change.
pub fn update(conn: &Connection, task: &Task) -> Result<usize> {
    let n = conn.execute(
        "UPDATE tasks SET text = ?1, description = ?2, done = ?3, due_date = ?4, reminder = ?5,
                          updated = datetime('now')
         WHERE id = ?6",
        rusqlite::params![
            task.text,
            task.description,
            task.done,
            task.due_date.as_ref().map(format_timestamp),
            task.reminder.as_ref().map(format_timestamp),
            task.id,
        ],
    )?;
    Ok(n)
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    let n = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    Ok(n)
}

pub fn list_for_list(
    conn: &Connection,
    list_id: i64,
    search: &str,
    page: Page,
) -> Result<(Vec<Task>, u64)> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE list_id = ?1 AND text LIKE ?2 ESCAPE '\\'",
        rusqlite::params![list_id, contains(search)],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE list_id = ?1 AND text LIKE ?2 ESCAPE '\\'
         ORDER BY tasks.id LIMIT ?3 OFFSET ?4"
    ))?;
    let rows = stmt
        .query_map(
            rusqlite::params![list_id, contains(search), page.limit(), page.offset()],
            task_from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((rows, total as u64))
}
