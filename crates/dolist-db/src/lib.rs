pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};

pub use queries::*;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    /// Opens a private in-memory database with the full schema applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }

    /// Runs `f` with the connection held for the duration of one request.
    pub fn with_conn<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let conn = self.lock()?;
        f(&conn)
    }
}

/// Runs `f` inside a named savepoint.
///
/// Outside a transaction the savepoint opens one; inside a transaction it nests.
/// On `Ok` the savepoint is released, on `Err` everything `f` wrote is rolled back
/// before the error is returned.
pub fn savepoint<F, T, E>(conn: &Connection, name: &'static str, f: F) -> std::result::Result<T, E>
where
    F: FnOnce(&Connection) -> std::result::Result<T, E>,
    E: From<anyhow::Error>,
{
    conn.execute_batch(&format!("SAVEPOINT {name}"))
        .map_err(|e| E::from(anyhow::Error::from(e)))?;

    match f(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {name}"))
                .map_err(|e| E::from(anyhow::Error::from(e)))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) =
                conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"))
            {
                error!("Rollback of savepoint {} failed: {}", name, rollback_err);
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_users(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_savepoint_commits_on_ok() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock().unwrap();

        savepoint(&conn, "sp_ok", |conn| {
            users::insert(conn, "alice", "alice@example.com", "hash")
        })
        .unwrap();

        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_savepoint_rolls_back_on_err() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock().unwrap();

        let result: Result<()> = savepoint(&conn, "sp_err", |conn| {
            users::insert(conn, "alice", "alice@example.com", "hash")?;
            Err(anyhow::anyhow!("boom"))
        });

        assert!(result.is_err());
        assert_eq!(count_users(&conn), 0);
    }

    #[test]
    fn test_nested_savepoint_rollback_keeps_outer_writes() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock().unwrap();

        savepoint(&conn, "outer", |conn| {
            users::insert(conn, "alice", "alice@example.com", "hash")?;
            let inner: Result<()> = savepoint(conn, "inner", |conn| {
                users::insert(conn, "bob", "bob@example.com", "hash")?;
                Err(anyhow::anyhow!("boom"))
            });
            assert!(inner.is_err());
            Ok::<_, anyhow::Error>(())
        })
        .unwrap();

        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_with_conn_propagates_errors() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<()> = db.with_conn(|_| Err(anyhow::anyhow!("nope")));
        assert!(result.is_err());
    }
}
