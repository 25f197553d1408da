//! Right associations between a subject (user or team) and a namespace or list.

use anyhow::Result;
use rusqlite::Connection;

use dolist_types::pagination::Page;
use dolist_types::rights::{Grant, Right, ShareTarget, Subject};

use super::{OptionalExt, contains, teams};
use crate::models::{GRANT_COLUMNS, USER_COLUMNS, grant_from_row, right, user_from_row};
use dolist_types::models::{Team, User};

/// Inserts the grant, or replaces the right of the existing one for the same
/// (subject, target). Returns the grant id.
pub fn upsert(conn: &Connection, subject: Subject, target: ShareTarget, level: Right) -> Result<i64> {
    conn.execute(
        "INSERT INTO rights (subject_kind, subject_id, resource_kind, resource_id, level)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (subject_kind, subject_id, resource_kind, resource_id)
         DO UPDATE SET level = excluded.level, updated = datetime('now')",
        rusqlite::params![
            subject.kind(),
            subject.id(),
            target.kind().as_str(),
            target.id(),
            level.as_i64(),
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM rights
         WHERE subject_kind = ?1 AND subject_id = ?2 AND resource_kind = ?3 AND resource_id = ?4",
        rusqlite::params![subject.kind(), subject.id(), target.kind().as_str(), target.id()],
        |r| r.get(0),
    )?;
    Ok(id)
}

pub fn get(conn: &Connection, subject: Subject, target: ShareTarget) -> Result<Option<Grant>> {
    conn.query_row(
        &format!(
            "SELECT {GRANT_COLUMNS} FROM rights
             WHERE subject_kind = ?1 AND subject_id = ?2 AND resource_kind = ?3 AND resource_id = ?4"
        ),
        rusqlite::params![subject.kind(), subject.id(), target.kind().as_str(), target.id()],
        grant_from_row,
    )
    .optional()
}

pub fn delete(conn: &Connection, subject: Subject, target: ShareTarget) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM rights
         WHERE subject_kind = ?1 AND subject_id = ?2 AND resource_kind = ?3 AND resource_id = ?4",
        rusqlite::params![subject.kind(), subject.id(), target.kind().as_str(), target.id()],
    )?;
    Ok(n)
}

/// All grants on `target`, oldest first.
pub fn for_target(conn: &Connection, target: ShareTarget) -> Result<Vec<Grant>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GRANT_COLUMNS} FROM rights
         WHERE resource_kind = ?1 AND resource_id = ?2
         ORDER BY rights.id"
    ))?;

    let rows = stmt
        .query_map(
            rusqlite::params![target.kind().as_str(), target.id()],
            grant_from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn for_subject(conn: &Connection, subject: Subject, page: Page) -> Result<(Vec<Grant>, u64)> {
    let total = count_for_subject(conn, subject)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {GRANT_COLUMNS} FROM rights
         WHERE subject_kind = ?1 AND subject_id = ?2
         ORDER BY rights.id LIMIT ?3 OFFSET ?4"
    ))?;

    let rows = stmt
        .query_map(
            rusqlite::params![subject.kind(), subject.id(), page.limit(), page.offset()],
            grant_from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((rows, total))
}

pub fn count_for_subject(conn: &Connection, subject: Subject) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM rights WHERE subject_kind = ?1 AND subject_id = ?2",
        rusqlite::params![subject.kind(), subject.id()],
        |r| r.get(0),
    )?;
    Ok(n as u64)
}

/// The right granted to the user directly on `target`.
pub fn user_grant(conn: &Connection, user_id: i64, target: ShareTarget) -> Result<Option<Right>> {
    conn.query_row(
        "SELECT level FROM rights
         WHERE subject_kind = 'user' AND subject_id = ?1 AND resource_kind = ?2 AND resource_id = ?3",
        rusqlite::params![user_id, target.kind().as_str(), target.id()],
        |row| right(row, 0),
    )
    .optional()
}

/// The highest right any of the user's teams holds on `target`.
pub fn best_team_grant(conn: &Connection, user_id: i64, target: ShareTarget) -> Result<Option<Right>> {
    conn.query_row(
        "SELECT r.level FROM rights r
         JOIN team_members tm ON tm.team_id = r.subject_id
         WHERE r.subject_kind = 'team' AND tm.user_id = ?1
           AND r.resource_kind = ?2 AND r.resource_id = ?3
         ORDER BY r.level DESC
         LIMIT 1",
        rusqlite::params![user_id, target.kind().as_str(), target.id()],
        |row| right(row, 0),
    )
    .optional()
}

/// Users with a direct grant on `target`, filtered by username, in grant order.
pub fn users_with_access(
    conn: &Connection,
    target: ShareTarget,
    search: &str,
    page: Page,
) -> Result<Vec<(User, Right)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS}, rights.level FROM rights
         JOIN users ON users.id = rights.subject_id
         WHERE rights.subject_kind = 'user' AND rights.resource_kind = ?1 AND rights.resource_id = ?2
           AND users.username LIKE ?3 ESCAPE '\\'
         ORDER BY rights.id LIMIT ?4 OFFSET ?5"
    ))?;

    let rows = stmt
        .query_map(
            rusqlite::params![
                target.kind().as_str(),
                target.id(),
                contains(search),
                page.limit(),
                page.offset(),
            ],
            |row| Ok((user_from_row(row)?, right(row, 5)?)),
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Teams with a grant on `target`, filtered by team name, in grant order.
pub fn teams_with_access(
    conn: &Connection,
    target: ShareTarget,
    search: &str,
    page: Page,
) -> Result<Vec<(Team, Right)>> {
    let mut stmt = conn.prepare(
        "SELECT teams.id, rights.level FROM rights
         JOIN teams ON teams.id = rights.subject_id
         WHERE rights.subject_kind = 'team' AND rights.resource_kind = ?1 AND rights.resource_id = ?2
           AND teams.name LIKE ?3 ESCAPE '\\'
         ORDER BY rights.id LIMIT ?4 OFFSET ?5",
    )?;

    let rows = stmt
        .query_map(
            rusqlite::params![
                target.kind().as_str(),
                target.id(),
                contains(search),
                page.limit(),
                page.offset(),
            ],
            |row| Ok((row.get::<_, i64>(0)?, right(row, 1)?)),
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut teams_with_rights = Vec::with_capacity(rows.len());
    for (team_id, level) in rows {
        if let Some(team) = teams::get(conn, team_id)? {
            teams_with_rights.push((team, level));
        }
    }
    Ok(teams_with_rights)
}
