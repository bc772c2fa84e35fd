//! SQLite fixture database - schema definitions and connection management
//!
//! This file contains:
//! - Database struct definition
//! - Connection management (new, init, close)
//! - Schema creation for the fixture tables
//!
//! Seed helpers for individual tables are in the tables/ subdirectory.

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

use crate::error::FixtureError;

/// Fixture database wrapper. The connection lives inside an `Option` so that
/// `close` can release it while the wrapper stays shareable; a taken
/// connection makes every later operation fail with `ResourceUnavailable`.
pub struct Database {
    pub(crate) conn: Mutex<Option<Connection>>,
}

impl Database {
    /// Open (or create) the fixture database and initialize its schema
    pub fn new(database_url: &str) -> Result<Self, FixtureError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// In-memory database, used by tests and ephemeral harness runs
    pub fn open_in_memory() -> Result<Self, FixtureError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create all fixture tables. Foreign keys are enforced on this
    /// connection so that deleting a parent row cascades to its children.
    fn init(conn: &Connection) -> SqliteResult<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS agents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                persona TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id INTEGER NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id INTEGER NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                value REAL NOT NULL,
                recorded_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id INTEGER NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
                severity TEXT NOT NULL,
                message TEXT NOT NULL,
                detail TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS api_keys (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token TEXT UNIQUE NOT NULL,
                label TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS refresh_tokens (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token TEXT UNIQUE NOT NULL,
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub(crate) fn closed() -> FixtureError {
        FixtureError::ResourceUnavailable("database connection is closed".to_string())
    }

    /// Execute a raw statement, returning the number of affected rows
    pub fn execute(&self, sql: &str) -> Result<usize, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let affected = conn.execute(sql, [])?;
        Ok(affected)
    }

    /// Number of rows currently in `table`
    pub fn row_count(&self, table: &str) -> Result<i64, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get::<_, i64>(0)
        })?;
        Ok(count)
    }

    /// Names of all user tables in the live schema, sorted
    pub fn table_names(&self) -> Result<Vec<String>, FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;

        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(names)
    }

    /// Empty the given tables in a single transaction. Callers pass child
    /// tables before their parents; cascade rules cover anything referencing
    /// the listed tables.
    pub fn clear_tables(&self, tables: &[&str]) -> Result<(), FixtureError> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or_else(Database::closed)?;

        let mut sql = String::from("BEGIN;\n");
        for table in tables {
            sql.push_str(&format!("DELETE FROM {};\n", table));
        }
        sql.push_str("COMMIT;");
        conn.execute_batch(&sql)?;

        Ok(())
    }

    /// Release the underlying connection. Closing an already-closed handle
    /// is a no-op; any later data operation fails with `ResourceUnavailable`.
    pub fn close(&self) -> Result<(), FixtureError> {
        let mut guard = self.conn.lock().unwrap();
        match guard.take() {
            Some(conn) => conn.close().map_err(|(_, e)| FixtureError::from(e)),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.conn.lock().unwrap().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_contains_all_fixture_tables() {
        let db = Database::open_in_memory().unwrap();
        let names = db.table_names().unwrap();
        for table in crate::fixtures::FIXTURE_TABLES {
            assert!(names.iter().any(|n| n == table), "missing table {}", table);
        }
    }

    #[test]
    fn test_new_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fixtures.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        assert_eq!(db.row_count("users").unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn test_row_count_on_unknown_table_is_storage_error() {
        let db = Database::open_in_memory().unwrap();
        match db.row_count("no_such_table") {
            Err(FixtureError::Storage(_)) => {}
            other => panic!("expected Storage error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.close().unwrap();
        assert!(db.is_closed());
        // Second close is a tolerated no-op
        db.close().unwrap();
    }

    #[test]
    fn test_operations_after_close_fail() {
        let db = Database::open_in_memory().unwrap();
        db.close().unwrap();
        match db.row_count("users") {
            Err(FixtureError::ResourceUnavailable(_)) => {}
            other => panic!("expected ResourceUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_clear_tables_cascades_from_users() {
        let db = Database::open_in_memory().unwrap();
        let user = db.insert_user("ada", "ada@example.com").unwrap();
        let agent = db.insert_agent(user.id, "scout", "curious").unwrap();
        db.insert_post(agent.id, "hello").unwrap();
        db.insert_api_key(user.id, "ci").unwrap();
        db.insert_refresh_token(user.id, 30).unwrap();

        db.clear_tables(&["users"]).unwrap();

        for table in ["users", "agents", "posts", "api_keys", "refresh_tokens"] {
            assert_eq!(db.row_count(table).unwrap(), 0, "{} not empty", table);
        }
    }
}
