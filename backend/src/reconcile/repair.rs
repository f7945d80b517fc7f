//! Durable orphan repair.
//!
//! The resolver rescues orphaned documents by name on every load. A repair run
//! rewrites the `document_type_id` of each rescued document to the canonical
//! primary id, after which the document resolves directly. Only documents that
//! currently stand in for a type are rewritten, so a run never changes what the
//! matrix shows, and a second run finds nothing left to do.
//!
//! Runs are throttled through a [`RepairThrottle`] backed by an injected clock and
//! state store.

use super::ReconciliationSnapshot;
use crate::clock::Clock;
use crate::store::{kinds, EntityStore, Record, StateStore, StoreError};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// State key holding the RFC 3339 timestamp of the last completed run.
pub const LAST_RUN_KEY: &str = "documents.last_repair_run";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairedDocument {
    pub document_id: String,
    pub employee_id: String,
    pub from_type_id: String,
    pub to_type_id: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairOutcome {
    /// True when the run was throttled and nothing was examined.
    pub skipped: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub repaired: Vec<RepairedDocument>,
}

/// The rewrites a repair run would perform on `snapshot`.
pub fn plan(snapshot: &ReconciliationSnapshot) -> Vec<RepairedDocument> {
    snapshot
        .rescued()
        .into_iter()
        .map(|(document, merged)| RepairedDocument {
            document_id: document.id.clone(),
            employee_id: document.employee_id.clone(),
            from_type_id: document.document_type_id.clone(),
            to_type_id: merged.primary.id.clone(),
            type_name: merged.primary.name.clone(),
        })
        .collect()
}

/// Applies `plan` to the store, logging one event per document.
pub fn apply(store: &dyn EntityStore, plan: &[RepairedDocument]) -> Result<(), StoreError> {
    for repair in plan {
        let mut fields = Record::new();
        fields.insert(
            "document_type_id".to_string(),
            Value::String(repair.to_type_id.clone()),
        );
        store.update(kinds::EMPLOYEE_DOCUMENT, &repair.document_id, fields)?;
        info!(
            target: "reconcile",
            "repaired document: document_id={} employee_id={} from_type_id={} to_type_id={} name={:?}",
            repair.document_id,
            repair.employee_id,
            repair.from_type_id,
            repair.to_type_id,
            repair.type_name
        );
    }
    Ok(())
}

pub struct RepairThrottle<'a> {
    clock: &'a dyn Clock,
    state: &'a dyn StateStore,
    ttl: Duration,
}

impl<'a> RepairThrottle<'a> {
    pub fn new(clock: &'a dyn Clock, state: &'a dyn StateStore, ttl: Duration) -> Self {
        RepairThrottle { clock, state, ttl }
    }

    /// Timestamp of the last recorded run. Unparseable values count as no run.
    pub fn last_run(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .state
            .get_state(LAST_RUN_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)))
    }

    /// Whether a run may start now. A recorded run in the future (clock skew)
    /// does not block.
    pub fn is_due(&self) -> Result<bool, StoreError> {
        let Some(last) = self.last_run()? else {
            return Ok(true);
        };
        let elapsed = self.clock.now().signed_duration_since(last);
        match elapsed.to_std() {
            Ok(elapsed) => Ok(elapsed >= self.ttl),
            Err(_) => Ok(true),
        }
    }

    pub fn record_run(&self) -> Result<DateTime<Utc>, StoreError> {
        let now = self.clock.now();
        self.state.set_state(LAST_RUN_KEY, &now.to_rfc3339())?;
        Ok(now)
    }
}
