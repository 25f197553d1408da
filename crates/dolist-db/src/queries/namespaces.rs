use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use dolist_types::models::Namespace;
use dolist_types::pagination::Page;

use super::{OptionalExt, contains, held_by_user};
use crate::models::{NAMESPACE_COLUMNS, namespace_from_row};

pub fn insert(conn: &Connection, title: &str, description: &str, owner_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO namespaces (title, description, owner_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![title, description, owner_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Namespace>> {
    conn.query_row(
        &format!("SELECT {NAMESPACE_COLUMNS} FROM namespaces WHERE id = ?1"),
        [id],
        namespace_from_row,
    )
    .optional()
}

pub fn update(conn: &Connection, namespace: &Namespace) -> Result<usize> {
    let n = conn.execute(
        "UPDATE namespaces SET title = ?1, description = ?2, updated = datetime('now') WHERE id = ?3",
        rusqlite::params![namespace.title, namespace.description, namespace.id],
    )?;
    Ok(n)
}

/// Deletes the namespace with all its lists, their tasks, and every grant on
/// any of them, atomically.
pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    crate::savepoint(conn, "delete_namespace", |conn| -> Result<usize> {
        let tasks = conn.execute(
            "DELETE FROM tasks WHERE list_id IN (SELECT id FROM lists WHERE namespace_id = ?1)",
            [id],
        )?;
        conn.execute(
            "DELETE FROM rights WHERE resource_kind = 'list'
               AND resource_id IN (SELECT id FROM lists WHERE namespace_id = ?1)",
            [id],
        )?;
        let lists = conn.execute("DELETE FROM lists WHERE namespace_id = ?1", [id])?;
        conn.execute(
            "DELETE FROM rights WHERE resource_kind = 'namespace' AND resource_id = ?1",
            [id],
        )?;
        let n = conn.execute("DELETE FROM namespaces WHERE id = ?1", [id])?;

        info!("Namespace {} deleted with {} lists and {} tasks", id, lists, tasks);
        Ok(n)
    })
}

/// Namespaces `user_id` owns or holds a grant on, filtered by title.
pub fn list_accessible(
    conn: &Connection,
    user_id: i64,
    search: &str,
    page: Page,
) -> Result<(Vec<Namespace>, u64)> {
    let filter = format!(
        "(namespaces.owner_id = ?1 OR {}) AND namespaces.title LIKE ?2 ESCAPE '\\'",
        held_by_user("namespace", "namespaces.id")
    );

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM namespaces WHERE {filter}"),
        rusqlite::params![user_id, contains(search)],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {NAMESPACE_COLUMNS} FROM namespaces WHERE {filter}
         ORDER BY namespaces.id LIMIT ?3 OFFSET ?4"
    ))?;
    let rows = stmt
        .query_map(
            rusqlite::params![user_id, contains(search), page.limit(), page.offset()],
            namespace_from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((rows, total as u64))
}
