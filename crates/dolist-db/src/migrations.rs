use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created     TEXT NOT NULL DEFAULT (datetime('now')),
                updated     TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE password_reset_tokens (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token_hash  TEXT NOT NULL UNIQUE,
                created     TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE teams (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                created_by_id   INTEGER NOT NULL REFERENCES users(id),
                created         TEXT NOT NULL DEFAULT (datetime('now')),
                updated         TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE team_members (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                team_id     INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                admin       INTEGER NOT NULL DEFAULT 0,
                created     TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(team_id, user_id)
            );

            CREATE INDEX idx_team_members_user ON team_members(user_id);

            CREATE TABLE namespaces (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                owner_id    INTEGER NOT NULL REFERENCES users(id),
                created     TEXT NOT NULL DEFAULT (datetime('now')),
                updated     TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE lists (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                namespace_id    INTEGER NOT NULL REFERENCES namespaces(id),
                owner_id        INTEGER NOT NULL REFERENCES users(id),
                created         TEXT NOT NULL DEFAULT (datetime('now')),
                updated         TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_lists_namespace ON lists(namespace_id);

            CREATE TABLE tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                text            TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                done            INTEGER NOT NULL DEFAULT 0,
                due_date        TEXT,
                reminder        TEXT,
                list_id         INTEGER NOT NULL REFERENCES lists(id),
                created_by_id   INTEGER NOT NULL REFERENCES users(id),
                created         TEXT NOT NULL DEFAULT (datetime('now')),
                updated         TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_tasks_list ON tasks(list_id);

            -- One row per (subject, resource). level: 0 = read, 1 = write, 2 = admin
            CREATE TABLE rights (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_kind    TEXT NOT NULL CHECK (subject_kind IN ('user', 'team')),
                subject_id      INTEGER NOT NULL,
                resource_kind   TEXT NOT NULL CHECK (resource_kind IN ('namespace', 'list')),
                resource_id     INTEGER NOT NULL,
                level           INTEGER NOT NULL CHECK (level IN (0, 1, 2)),
                created         TEXT NOT NULL DEFAULT (datetime('now')),
                updated         TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(subject_kind, subject_id, resource_kind, resource_id)
            );

            CREATE INDEX idx_rights_resource ON rights(resource_kind, resource_id);

            CREATE TABLE notifications (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                notifiable_id   INTEGER NOT NULL REFERENCES users(id),
                name            TEXT NOT NULL,
                subject_id      INTEGER,
                notification    TEXT NOT NULL,
                created         TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_notifications_notifiable
                ON notifications(notifiable_id, id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
