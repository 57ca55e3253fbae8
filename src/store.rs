use crate::models::IncidentRecord;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("timestamp parse error: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Key-value persistence for incident records: one row per incident id,
/// unconditional upsert on write, no deletion. Writes from concurrently
/// spawned per-incident tasks serialize on the connection lock;
/// last write wins.
#[derive(Debug)]
pub struct IncidentStore {
    connection: Mutex<Connection>,
}

impl IncidentStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let connection = Connection::open(path)?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.connection.lock().map_err(|_| StorageError::Poisoned)
    }

    fn ensure_schema(&self) -> Result<(), StorageError> {
        self.lock()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS incident_records (
                incident_id TEXT PRIMARY KEY,
                last_update TEXT NOT NULL,
                message_id TEXT,
                resolved INTEGER NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    /// All incident ids ever observed. An empty result means the store has
    /// never been seeded.
    pub fn list_ids(&self) -> Result<Vec<String>, StorageError> {
        let connection = self.lock()?;
        let mut statement = connection.prepare("SELECT incident_id FROM incident_records")?;
        let rows = statement.query_map([], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }

        Ok(ids)
    }

    pub fn get(&self, incident_id: &str) -> Result<Option<IncidentRecord>, StorageError> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(
            "
            SELECT incident_id, last_update, message_id, resolved
            FROM incident_records
            WHERE incident_id = ?1
            ",
        )?;

        let raw: Option<(String, String, Option<String>, i64)> = statement
            .query_row(params![incident_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()?;

        let (incident_id, last_update_raw, message_id, resolved_raw) = match raw {
            Some(values) => values,
            None => return Ok(None),
        };

        let last_update = DateTime::parse_from_rfc3339(&last_update_raw)?.with_timezone(&Utc);

        Ok(Some(IncidentRecord {
            incident_id,
            last_update,
            message_id,
            resolved: resolved_raw != 0,
        }))
    }

    /// Upserts the record for its incident id, overwriting any prior row.
    pub fn set(&self, record: &IncidentRecord) -> Result<(), StorageError> {
        let resolved: i64 = if record.resolved { 1 } else { 0 };
        self.lock()?.execute(
            "
            INSERT INTO incident_records (incident_id, last_update, message_id, resolved)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(incident_id) DO UPDATE SET
                last_update = excluded.last_update,
                message_id = excluded.message_id,
                resolved = excluded.resolved
            ",
            params![
                record.incident_id,
                record.last_update.to_rfc3339(),
                record.message_id,
                resolved,
            ],
        )?;

        Ok(())
    }
}
