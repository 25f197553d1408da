use anyhow::Result;
use rusqlite::Connection;

use dolist_types::models::User;

use super::OptionalExt;
use crate::models::{USER_COLUMNS, user_from_row};

pub fn insert(conn: &Connection, username: &str, email: &str, password_hash: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
        (username, email, password_hash),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        user_from_row,
    )
    .optional()
}

pub fn get_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
        [username],
        user_from_row,
    )
    .optional()
}

pub fn username_taken(conn: &Connection, username: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        [username],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

pub fn email_taken(conn: &Connection, email: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        [email],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

/// Returns the user together with their stored password hash.
pub fn get_credentials(conn: &Connection, username: &str) -> Result<Option<(User, String)>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS}, users.password FROM users WHERE username = ?1"),
        [username],
        |row| Ok((user_from_row(row)?, row.get(5)?)),
    )
    .optional()
}

pub fn update_password(conn: &Connection, user_id: i64, password_hash: &str) -> Result<usize> {
    let n = conn.execute(
        "UPDATE users SET password = ?1, updated = datetime('now') WHERE id = ?2",
        rusqlite::params![password_hash, user_id],
    )?;
    Ok(n)
}

// -- Password reset tokens --

pub fn insert_reset_token(conn: &Connection, user_id: i64, token_hash: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO password_reset_tokens (user_id, token_hash) VALUES (?1, ?2)",
        rusqlite::params![user_id, token_hash],
    )?;
    Ok(())
}

/// Deletes the token and returns the user it belonged to. Tokens are single use.
pub fn take_reset_token(conn: &Connection, token_hash: &str) -> Result<Option<i64>> {
    let user_id: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM password_reset_tokens WHERE token_hash = ?1",
            [token_hash],
            |r| r.get(0),
        )
        .optional()?;

    if user_id.is_some() {
        conn.execute(
            "DELETE FROM password_reset_tokens WHERE token_hash = ?1",
            [token_hash],
        )?;
    }

    Ok(user_id)
}
