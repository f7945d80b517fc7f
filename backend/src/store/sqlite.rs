//! SQLite-backed [`EntityStore`]. One table holds every record as a JSON text
//! column keyed by `(kind, id)`; a second table holds key/value state.

use super::{matches, sort_records, EntityStore, Record, StateStore, StoreError};
use crate::clock::{Clock, SystemClock};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entities (
        seq  INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        id   TEXT NOT NULL,
        data TEXT NOT NULL,
        UNIQUE (kind, id)
    );
    CREATE TABLE IF NOT EXISTS app_state (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Fields owned by the store; callers cannot overwrite them through `update`.
const RESERVED_FIELDS: [&str; 2] = ["id", "created_date"];

pub struct SqliteStore {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?, Arc::new(SystemClock))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, Arc::new(SystemClock))
    }

    pub fn with_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
            clock,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn timestamp(&self) -> Value {
        Value::String(self.clock.now().to_rfc3339())
    }

    fn load_kind(conn: &Connection, kind: &str) -> Result<Vec<Record>, StoreError> {
        let mut stmt = conn.prepare("SELECT data FROM entities WHERE kind = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![kind], |row| row.get::<_, String>(0))?;
        let mut records = Vec::new();
        for data in rows {
            records.push(serde_json::from_str::<Record>(&data?)?);
        }
        Ok(records)
    }

    fn load_one(conn: &Connection, kind: &str, id: &str) -> Result<Record, StoreError> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM entities WHERE kind = ?1 AND id = ?2",
                params![kind, id],
                |row| row.get(0),
            )
            .optional()?;
        match data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(not_found(kind, id)),
        }
    }

    fn insert(&self, tx: &Transaction<'_>, kind: &str, mut fields: Record) -> Result<Record, StoreError> {
        let id = match fields.get("id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        let now = self.timestamp();
        fields.insert("id".to_string(), Value::String(id.clone()));
        fields.insert("created_date".to_string(), now.clone());
        fields.insert("updated_date".to_string(), now);

        let data = serde_json::to_string(&fields)?;
        match tx.execute(
            "INSERT INTO entities (kind, id, data) VALUES (?1, ?2, ?3)",
            params![kind, id, data],
        ) {
            Ok(_) => Ok(fields),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::AlreadyExists {
                    kind: kind.to_string(),
                    id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl EntityStore for SqliteStore {
    fn list(
        &self,
        kind: &str,
        sort_key: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = Self::load_kind(&*self.lock()?, kind)?;
        if let Some(sort_key) = sort_key {
            sort_records(&mut records, sort_key);
        }
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    fn filter(&self, kind: &str, criteria: &Record) -> Result<Vec<Record>, StoreError> {
        let mut records = Self::load_kind(&*self.lock()?, kind)?;
        records.retain(|record| matches(record, criteria));
        Ok(records)
    }

    fn get(&self, kind: &str, id: &str) -> Result<Record, StoreError> {
        Self::load_one(&*self.lock()?, kind, id)
    }

    fn create(&self, kind: &str, fields: Record) -> Result<Record, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let record = self.insert(&tx, kind, fields)?;
        tx.commit()?;
        Ok(record)
    }

    fn bulk_create(&self, kind: &str, fields: Vec<Record>) -> Result<Vec<Record>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(fields.len());
        for record in fields {
            created.push(self.insert(&tx, kind, record)?);
        }
        tx.commit()?;
        Ok(created)
    }

    fn update(&self, kind: &str, id: &str, fields: Record) -> Result<Record, StoreError> {
        let conn = self.lock()?;
        let mut record = Self::load_one(&conn, kind, id)?;
        for (field, value) in fields {
            if !RESERVED_FIELDS.contains(&field.as_str()) {
                record.insert(field, value);
            }
        }
        record.insert("updated_date".to_string(), self.timestamp());

        conn.execute(
            "UPDATE entities SET data = ?1 WHERE kind = ?2 AND id = ?3",
            params![serde_json::to_string(&record)?, kind, id],
        )?;
        Ok(record)
    }

    fn delete(&self, kind: &str, id: &str) -> Result<(), StoreError> {
        let deleted = self.lock()?.execute(
            "DELETE FROM entities WHERE kind = ?1 AND id = ?2",
            params![kind, id],
        )?;
        if deleted == 0 {
            return Err(not_found(kind, id));
        }
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn get_state(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .lock()?
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_state(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

fn not_found(kind: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}
