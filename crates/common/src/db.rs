//! SQLite database for simulated cloud state

use crate::types::Transition;
use crate::{Error, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Database wrapper for state persistence
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path.as_ref())?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        info!("Opened database at {:?}", path.as_ref());
        Ok(db)
    }

    /// Open in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cloud_resources (
                kind TEXT NOT NULL,
                id TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                body TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT '',
                transition TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                generation INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (kind, id)
            );

            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        debug!("Database schema initialized");
        Ok(())
    }

    /// Insert a new record
    pub fn insert<T: serde::Serialize>(
        &self,
        kind: &str,
        id: &str,
        name: &str,
        body: &T,
        status: &str,
        transition: Option<&Transition>,
    ) -> Result<()> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();
        let transition = transition.map(serde_json::to_string).transpose()?;

        conn.execute(
            r#"
            INSERT INTO cloud_resources (kind, id, name, body, status, transition, created_at, updated_at, generation)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, 1)
            "#,
            params![kind, id, name, serde_json::to_string(body)?, status, transition, now],
        )?;

        debug!("Inserted {} {}", kind, id);
        Ok(())
    }

    /// Replace the body of an existing record
    pub fn update<T: serde::Serialize>(&self, kind: &str, id: &str, body: &T) -> Result<bool> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();

        let rows = conn.execute(
            r#"
            UPDATE cloud_resources
            SET body = ?3, updated_at = ?4, generation = generation + 1
            WHERE kind = ?1 AND id = ?2
            "#,
            params![kind, id, serde_json::to_string(body)?, now],
        )?;

        Ok(rows > 0)
    }

    /// Set the status of a record and the transition it is waiting on
    pub fn set_status(
        &self,
        kind: &str,
        id: &str,
        status: &str,
        transition: Option<&Transition>,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();
        let transition = transition.map(serde_json::to_string).transpose()?;

        let rows = conn.execute(
            r#"
            UPDATE cloud_resources
            SET status = ?3, transition = ?4, updated_at = ?5
            WHERE kind = ?1 AND id = ?2
            "#,
            params![kind, id, status, transition, now],
        )?;

        Ok(rows > 0)
    }

    /// Get a record by id
    pub fn get<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        id: &str,
    ) -> Result<Option<ResourceRow<T>>> {
        let conn = self.conn.lock();

        let raw = conn
            .query_row(
                &format!("{} WHERE kind = ?1 AND id = ?2", SELECT_ROW),
                params![kind, id],
                RawRow::from_row,
            )
            .optional()?;

        raw.map(|r| r.parse()).transpose()
    }

    /// List all records of a kind, oldest first
    pub fn list<T: serde::de::DeserializeOwned>(&self, kind: &str) -> Result<Vec<ResourceRow<T>>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(&format!(
            "{} WHERE kind = ?1 ORDER BY rowid",
            SELECT_ROW
        ))?;
        let rows = stmt
            .query_map(params![kind], RawRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(|r| r.parse()).collect()
    }

    /// Summaries of every record regardless of kind
    pub fn list_all(&self) -> Result<Vec<RecordSummary>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT kind, id, name, status, updated_at FROM cloud_resources ORDER BY kind, rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RecordSummary {
                    kind: row.get(0)?,
                    id: row.get(1)?,
                    name: row.get(2)?,
                    status: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Delete a record
    pub fn delete(&self, kind: &str, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "DELETE FROM cloud_resources WHERE kind = ?1 AND id = ?2",
            params![kind, id],
        )?;
        Ok(rows > 0)
    }

    /// Check if a record exists
    pub fn exists(&self, kind: &str, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cloud_resources WHERE kind = ?1 AND id = ?2",
            params![kind, id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Drop every record and key
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch("DELETE FROM cloud_resources; DELETE FROM kv_store;")?;
        info!("Cleared simulated cloud state");
        Ok(())
    }

    /// Set a key-value pair
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, now],
        )?;
        Ok(())
    }

    /// Get a value by key
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    /// Delete a key
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

const SELECT_ROW: &str = "SELECT id, name, body, status, transition, created_at, updated_at, generation FROM cloud_resources";

/// Raw database row before parsing
struct RawRow {
    id: String,
    name: String,
    body: String,
    status: String,
    transition: Option<String>,
    created_at: i64,
    updated_at: i64,
    generation: i64,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            body: row.get(2)?,
            status: row.get(3)?,
            transition: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            generation: row.get(7)?,
        })
    }

    fn parse<T: serde::de::DeserializeOwned>(self) -> Result<ResourceRow<T>> {
        Ok(ResourceRow {
            id: self.id,
            name: self.name,
            body: serde_json::from_str(&self.body)?,
            status: self.status,
            transition: self
                .transition
                .as_deref()
                .map(|t| serde_json::from_str(t))
                .transpose()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            generation: self.generation,
        })
    }
}

/// Parsed record row
#[derive(Debug, Clone)]
pub struct ResourceRow<T> {
    pub id: String,
    pub name: String,
    pub body: T,
    pub status: String,
    pub transition: Option<Transition>,
    pub created_at: i64,
    pub updated_at: i64,
    pub generation: i64,
}

/// Kind-agnostic view of a record
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordSummary {
    pub kind: String,
    pub id: String,
    pub name: String,
    pub status: String,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestBody {
        value: String,
    }

    #[test]
    fn test_crud() {
        let db = Database::open_memory().unwrap();
        let body = TestBody {
            value: "test".to_string(),
        };

        // Insert
        db.insert("widget", "w-1", "first", &body, "pending", None)
            .unwrap();

        // Get
        let row: ResourceRow<TestBody> = db.get("widget", "w-1").unwrap().unwrap();
        assert_eq!(row.body.value, "test");
        assert_eq!(row.status, "pending");
        assert_eq!(row.generation, 1);

        // Same id under a different kind is a different record
        assert!(db.get::<TestBody>("gadget", "w-1").unwrap().is_none());

        // Update
        let changed = TestBody {
            value: "changed".to_string(),
        };
        assert!(db.update("widget", "w-1", &changed).unwrap());
        let row: ResourceRow<TestBody> = db.get("widget", "w-1").unwrap().unwrap();
        assert_eq!(row.body, changed);
        assert_eq!(row.generation, 2);

        // List
        let rows: Vec<ResourceRow<TestBody>> = db.list("widget").unwrap();
        assert_eq!(rows.len(), 1);

        // Delete
        assert!(db.delete("widget", "w-1").unwrap());
        assert!(!db.exists("widget", "w-1").unwrap());
        assert!(!db.delete("widget", "w-1").unwrap());
    }

    #[test]
    fn test_status_and_transition() {
        let db = Database::open_memory().unwrap();
        let body = TestBody {
            value: "x".to_string(),
        };
        let pending = Transition::to("available", 2);
        db.insert("widget", "w-1", "", &body, "pending", Some(&pending))
            .unwrap();

        let row: ResourceRow<TestBody> = db.get("widget", "w-1").unwrap().unwrap();
        assert_eq!(row.transition, Some(pending));

        assert!(db.set_status("widget", "w-1", "available", None).unwrap());
        let row: ResourceRow<TestBody> = db.get("widget", "w-1").unwrap().unwrap();
        assert_eq!(row.status, "available");
        assert!(row.transition.is_none());

        let all = db.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, "widget");
    }

    #[test]
    fn test_kv_and_clear() {
        let db = Database::open_memory().unwrap();
        db.kv_set("ses/active_rule_set", "primary").unwrap();
        assert_eq!(
            db.kv_get("ses/active_rule_set").unwrap().as_deref(),
            Some("primary")
        );
        db.kv_delete("ses/active_rule_set").unwrap();
        assert!(db.kv_get("ses/active_rule_set").unwrap().is_none());

        db.kv_set("k", "v").unwrap();
        db.clear().unwrap();
        assert!(db.kv_get("k").unwrap().is_none());
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store").join("cloud.db");
        {
            let db = Database::open(&path).unwrap();
            db.kv_set("k", "v").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v"));
    }
}
