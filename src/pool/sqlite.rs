// src/pool/sqlite.rs
//! SQLite-backed result store
//!
//! Lets a host and its callers share results across process boundaries on
//! one machine. SQLite has no notification mechanism, so this backend is
//! always paired with [`StoreResultPool`]'s bounded polling.

use crate::pool::store::ResultStore;
use crate::utils::errors::{FabricError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// [`ResultStore`] over a SQLite database file
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| FabricError::Storage(format!("failed to open database: {}", e)))?;
        Self::init_schema(&conn)?;

        info!("Result store opened at {:?}", path.as_ref());
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, private to this store
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| FabricError::Storage(format!("failed to open database: {}", e)))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(db: &Connection) -> Result<()> {
        db.execute(
            r#"
            CREATE TABLE IF NOT EXISTS call_results (
                ticket INTEGER PRIMARY KEY,
                resolved INTEGER NOT NULL DEFAULT 0,
                payload BLOB,
                created_at INTEGER NOT NULL
            )
            "#,
            [],
        )
        .map_err(|e| FabricError::Storage(format!("schema creation failed: {}", e)))?;

        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_created_at ON call_results(created_at)",
            [],
        )
        .map_err(|e| FabricError::Storage(format!("index creation failed: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn insert_pending(&self, ticket: u64) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO call_results (ticket, resolved, payload, created_at) VALUES (?1, 0, NULL, ?2)",
            params![ticket as i64, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    async fn resolve(&self, ticket: u64, payload: &[u8]) -> Result<()> {
        let db = self.db.lock().await;
        let changed = db.execute(
            "UPDATE call_results SET resolved = 1, payload = ?1 WHERE ticket = ?2 AND resolved = 0",
            params![payload, ticket as i64],
        )?;

        if changed == 1 {
            return Ok(());
        }

        // Distinguish "already resolved" from "row gone".
        let existing: Option<i64> = db
            .query_row(
                "SELECT resolved FROM call_results WHERE ticket = ?1",
                params![ticket as i64],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(_) => Err(FabricError::TicketResolved(ticket)),
            None => Err(FabricError::TicketExpired(ticket)),
        }
    }

    async fn fetch(&self, ticket: u64) -> Result<Option<Vec<u8>>> {
        let db = self.db.lock().await;
        let row: Option<(i64, Option<Vec<u8>>)> = db
            .query_row(
                "SELECT resolved, payload FROM call_results WHERE ticket = ?1",
                params![ticket as i64],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Err(FabricError::TicketExpired(ticket)),
            Some((0, _)) => Ok(None),
            Some((_, Some(payload))) => Ok(Some(payload)),
            Some((_, None)) => Err(FabricError::Storage(format!(
                "resolved row without payload: t-{}",
                ticket
            ))),
        }
    }

    async fn purge(&self, max_entries: usize, ttl: Duration) -> Result<u64> {
        let db = self.db.lock().await;
        let mut removed = 0u64;

        // TTL first, then the capacity bound oldest first (ticket order is
        // insertion order).
        let cutoff = chrono::Utc::now().timestamp_millis() - ttl.as_millis() as i64;
        removed += db.execute(
            "DELETE FROM call_results WHERE created_at <= ?1",
            params![cutoff],
        )? as u64;

        let count: i64 = db.query_row("SELECT COUNT(*) FROM call_results", [], |row| row.get(0))?;
        let excess = count - max_entries as i64;
        if excess > 0 {
            removed += db.execute(
                "DELETE FROM call_results WHERE ticket IN (
                    SELECT ticket FROM call_results ORDER BY ticket ASC LIMIT ?1
                )",
                params![excess],
            )? as u64;
        }

        Ok(removed)
    }

    async fn counts(&self) -> Result<(u64, u64)> {
        let db = self.db.lock().await;
        let pending: i64 = db.query_row(
            "SELECT COUNT(*) FROM call_results WHERE resolved = 0",
            [],
            |row| row.get(0),
        )?;
        let resolved: i64 = db.query_row(
            "SELECT COUNT(*) FROM call_results WHERE resolved = 1",
            [],
            |row| row.get(0),
        )?;
        Ok((pending as u64, resolved as u64))
    }

    async fn max_ticket(&self) -> Result<u64> {
        let db = self.db.lock().await;
        let max: i64 = db.query_row(
            "SELECT COALESCE(MAX(ticket), 0) FROM call_results",
            [],
            |row| row.get(0),
        )?;
        Ok(max as u64)
    }
}
