use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use dolist_types::models::List;
use dolist_types::pagination::Page;

use super::{OptionalExt, contains, held_by_user};
use crate::models::{LIST_COLUMNS, list_from_row};

pub fn insert(
    conn: &Connection,
    title: &str,
    description: &str,
    namespace_id: i64,
    owner_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO lists (title, description, namespace_id, owner_id) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![title, description, namespace_id, owner_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<List>> {
    conn.query_row(
        &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
        [id],
        list_from_row,
    )
    .optional()
}

pub fn update(conn: &Connection, list: &List) -> Result<usize> {
    let n = conn.execute(
        "UPDATE lists SET title = ?1, description = ?2, updated = datetime('now') WHERE id = ?3",
        rusqlite::params![list.title, list.description, list.id],
    )?;
    Ok(n)
}

/// Deletes the list with its tasks and grants, atomically.
pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    crate::savepoint(conn, "delete_list", |conn| -> Result<usize> {
        let tasks = conn.execute("DELETE FROM tasks WHERE list_id = ?1", [id])?;
        conn.execute(
            "DELETE FROM rights WHERE resource_kind = 'list' AND resource_id = ?1",
            [id],
        )?;
        let n = conn.execute("DELETE FROM lists WHERE id = ?1", [id])?;

        info!("List {} deleted with {} tasks", id, tasks);
        Ok(n)
    })
}

/// Lists `user_id` can see: owned, in an owned namespace, or reachable through
/// a grant on the list or its namespace. Filtered by title.
pub fn list_accessible(
    conn: &Connection,
    user_id: i64,
    search: &str,
    page: Page,
) -> Result<(Vec<List>, u64)> {
    let filter = format!(
        "(lists.owner_id = ?1 OR namespaces.owner_id = ?1 OR {} OR {}) AND lists.title LIKE ?2 ESCAPE '\\'",
        held_by_user("list", "lists.id"),
        held_by_user("namespace", "lists.namespace_id"),
    );
    let from = "lists JOIN namespaces ON namespaces.id = lists.namespace_id";

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {from} WHERE {filter}"),
        rusqlite::params![user_id, contains(search)],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {LIST_COLUMNS} FROM {from} WHERE {filter}
         ORDER BY lists.id LIMIT ?3 OFFSET ?4"
    ))?;
    let rows = stmt
        .query_map(
            rusqlite::params![user_id, contains(search), page.limit(), page.offset()],
            list_from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((rows, total as u64))
}
