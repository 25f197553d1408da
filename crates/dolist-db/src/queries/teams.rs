use anyhow::Result;
use rusqlite::Connection;

use dolist_types::models::{Team, TeamMember};
use dolist_types::pagination::Page;

use super::{OptionalExt, contains};
use crate::models::{USER_COLUMNS, parse_timestamp, user_from_row};

/// Team row without its members.
struct TeamRow {
    id: i64,
    name: String,
    description: String,
    created_by_id: i64,
    created: String,
    updated: String,
}

const TEAM_COLUMNS: &str =
    "teams.id, teams.name, teams.description, teams.created_by_id, teams.created, teams.updated";

fn team_row(row: &rusqlite::Row) -> rusqlite::Result<TeamRow> {
    Ok(TeamRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_by_id: row.get(3)?,
        created: row.get(4)?,
        updated: row.get(5)?,
    })
}

fn into_team(conn: &Connection, row: TeamRow) -> Result<Team> {
    let created = parse_timestamp(&row.created)
        .ok_or_else(|| anyhow::anyhow!("Corrupt created '{}' on team {}", row.created, row.id))?;
    let updated = parse_timestamp(&row.updated)
        .ok_or_else(|| anyhow::anyhow!("Corrupt updated '{}' on team {}", row.updated, row.id))?;

    Ok(Team {
        members: members(conn, row.id)?,
        id: row.id,
        name: row.name,
        description: row.description,
        created_by_id: row.created_by_id,
        created,
        updated,
    })
}

pub fn insert(conn: &Connection, name: &str, description: &str, created_by_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO teams (name, description, created_by_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, description, created_by_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM teams WHERE id = ?1", [id], |r| r.get(0))?;
    Ok(n > 0)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Team>> {
    let row = conn
        .query_row(
            &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?1"),
            [id],
            team_row,
        )
        .optional()?;

    row.map(|row| into_team(conn, row)).transpose()
}

pub fn update(conn: &Connection, team: &Team) -> Result<usize> {
    let n = conn.execute(
        "UPDATE teams SET name = ?1, description = ?2, updated = datetime('now') WHERE id = ?3",
        rusqlite::params![team.name, team.description, team.id],
    )?;
    Ok(n)
}

/// Deletes the team and its memberships.
pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM team_members WHERE team_id = ?1", [id])?;
    let n = conn.execute("DELETE FROM teams WHERE id = ?1", [id])?;
    Ok(n)
}

/// Teams `user_id` is a member of, filtered by name.
pub fn list_for_user(
    conn: &Connection,
    user_id: i64,
    search: &str,
    page: Page,
) -> Result<(Vec<Team>, u64)> {
    let filter = "teams.id IN (SELECT team_id FROM team_members WHERE user_id = ?1)
                  AND teams.name LIKE ?2 ESCAPE '\\'";

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM teams WHERE {filter}"),
        rusqlite::params![user_id, contains(search)],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE {filter} ORDER BY teams.id LIMIT ?3 OFFSET ?4"
    ))?;
    let rows = stmt
        .query_map(
            rusqlite::params![user_id, contains(search), page.limit(), page.offset()],
            team_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let teams = rows
        .into_iter()
        .map(|row| into_team(conn, row))
        .collect::<Result<Vec<_>>>()?;

    Ok((teams, total as u64))
}

// -- Members --

pub fn members(conn: &Connection, team_id: i64) -> Result<Vec<TeamMember>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS}, team_members.admin, team_members.created
         FROM team_members
         JOIN users ON users.id = team_members.user_id
         WHERE team_members.team_id = ?1
         ORDER BY team_members.id"
    ))?;

    let rows = stmt
        .query_map([team_id], |row| {
            let created: String = row.get(6)?;
            Ok((user_from_row(row)?, row.get::<_, bool>(5)?, created))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(user, admin, created)| {
            let created = parse_timestamp(&created).ok_or_else(|| {
                anyhow::anyhow!("Corrupt created '{}' on membership of team {}", created, team_id)
            })?;
            Ok(TeamMember { user, admin, created })
        })
        .collect()
}

pub fn insert_member(conn: &Connection, team_id: i64, user_id: i64, admin: bool) -> Result<()> {
    conn.execute(
        "INSERT INTO team_members (team_id, user_id, admin) VALUES (?1, ?2, ?3)",
        rusqlite::params![team_id, user_id, admin],
    )?;
    Ok(())
}

pub fn delete_member(conn: &Connection, team_id: i64, user_id: i64) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM team_members WHERE team_id = ?1 AND user_id = ?2",
        rusqlite::params![team_id, user_id],
    )?;
    Ok(n)
}

pub fn set_member_admin(conn: &Connection, team_id: i64, user_id: i64, admin: bool) -> Result<usize> {
    let n = conn.execute(
        "UPDATE team_members SET admin = ?1 WHERE team_id = ?2 AND user_id = ?3",
        rusqlite::params![admin, team_id, user_id],
    )?;
    Ok(n)
}

/// Returns `Some(admin)` when `user_id` is a member of the team.
pub fn membership(conn: &Connection, team_id: i64, user_id: i64) -> Result<Option<bool>> {
    conn.query_row(
        "SELECT admin FROM team_members WHERE team_id = ?1 AND user_id = ?2",
        rusqlite::params![team_id, user_id],
        |r| r.get(0),
    )
    .optional()
}

pub fn member_count(conn: &Connection, team_id: i64) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM team_members WHERE team_id = ?1",
        [team_id],
        |r| r.get(0),
    )?;
    Ok(n as u64)
}
