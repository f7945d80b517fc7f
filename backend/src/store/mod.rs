//! # Entity Store
//!
//! Persistence boundary of the service. Records are schemaless JSON objects grouped
//! by an entity *kind* (`"Employee"`, `"EmployeeDocument"`, ...), mirroring the
//! list / filter / create / update / delete contract of a hosted entity store.
//!
//! - [`EntityStore`] is object safe and works on raw [`Record`]s, so handlers can
//!   share one `Arc<dyn EntityStore>`.
//! - [`EntityStoreExt`] layers typed, serde-based helpers on top of any store.
//! - [`StateStore`] is a tiny key/value side table for bookkeeping such as the
//!   last document repair run.
//!
//! The store assigns `id`, `created_date` and `updated_date` on every record.

pub mod files;
pub mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;

pub use sqlite::SqliteStore;

/// One stored entity.
pub type Record = Map<String, Value>;

pub mod kinds {
    pub const CATEGORY: &str = "Category";
    pub const EMPLOYEE: &str = "Employee";
    pub const EMPLOYEE_DOCUMENT: &str = "EmployeeDocument";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },
    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: String, id: String },
    #[error("record fields must be a JSON object")]
    NotAnObject,
    #[error("malformed record: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("store connection lock poisoned")]
    Poisoned,
}

pub trait EntityStore: Send + Sync {
    /// All records of `kind`, in creation order unless `sort_key` is given.
    /// A leading `-` on the sort key sorts descending.
    fn list(
        &self,
        kind: &str,
        sort_key: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Records of `kind` whose fields equal every entry of `criteria`.
    fn filter(&self, kind: &str, criteria: &Record) -> Result<Vec<Record>, StoreError>;

    fn get(&self, kind: &str, id: &str) -> Result<Record, StoreError>;

    fn create(&self, kind: &str, fields: Record) -> Result<Record, StoreError>;

    /// Creates every record or none of them.
    fn bulk_create(&self, kind: &str, fields: Vec<Record>) -> Result<Vec<Record>, StoreError>;

    /// Shallow merge of `fields` into the stored record.
    fn update(&self, kind: &str, id: &str, fields: Record) -> Result<Record, StoreError>;

    fn delete(&self, kind: &str, id: &str) -> Result<(), StoreError>;
}

pub trait StateStore: Send + Sync {
    fn get_state(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_state(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Typed access on top of [`EntityStore`].
pub trait EntityStoreExt: EntityStore {
    fn list_as<T: DeserializeOwned>(
        &self,
        kind: &str,
        sort_key: Option<&str>,
    ) -> Result<Vec<T>, StoreError> {
        decode_all(self.list(kind, sort_key, None)?)
    }

    fn filter_as<T: DeserializeOwned>(
        &self,
        kind: &str,
        criteria: &Record,
    ) -> Result<Vec<T>, StoreError> {
        decode_all(self.filter(kind, criteria)?)
    }

    fn get_as<T: DeserializeOwned>(&self, kind: &str, id: &str) -> Result<T, StoreError> {
        decode(self.get(kind, id)?)
    }

    fn create_from<I: Serialize, T: DeserializeOwned>(
        &self,
        kind: &str,
        input: &I,
    ) -> Result<T, StoreError> {
        decode(self.create(kind, to_record(input)?)?)
    }

    fn update_from<I: Serialize, T: DeserializeOwned>(
        &self,
        kind: &str,
        id: &str,
        input: &I,
    ) -> Result<T, StoreError> {
        decode(self.update(kind, id, to_record(input)?)?)
    }
}

impl<S: EntityStore + ?Sized> EntityStoreExt for S {}

pub fn to_record<I: Serialize + ?Sized>(input: &I) -> Result<Record, StoreError> {
    match serde_json::to_value(input)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Builds an equality filter from `(field, value)` pairs.
pub fn criteria<const N: usize>(pairs: [(&str, Value); N]) -> Record {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}

fn decode<T: DeserializeOwned>(record: Record) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

fn decode_all<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>, StoreError> {
    records.into_iter().map(decode).collect()
}

pub(crate) fn matches(record: &Record, criteria: &Record) -> bool {
    criteria
        .iter()
        .all(|(field, expected)| record.get(field).unwrap_or(&Value::Null) == expected)
}

/// Stable sort by one field. Missing and `null` values always go last,
/// regardless of direction.
pub(crate) fn sort_records(records: &mut [Record], sort_key: &str) {
    let (field, descending) = match sort_key.strip_prefix('-') {
        Some(field) => (field, true),
        None => (sort_key, false),
    };
    records.sort_by(|a, b| {
        let a = a.get(field).filter(|v| !v.is_null());
        let b = b.get(field).filter(|v| !v.is_null());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) if descending => compare_values(b, a),
            (Some(a), Some(b)) => compare_values(a, b),
        }
    });
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
