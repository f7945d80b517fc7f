//! Read models for the document matrix: one row per employee, one cell per
//! canonical document type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a document was linked to a canonical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPath {
    /// The document references one of the type's own ids.
    Direct,
    /// The document references a type id that no longer exists in the catalog,
    /// and was matched through the name recorded in the secondary catalog.
    Orphan,
}

/// Expiry state of a document relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpiryStatus {
    NoExpiry,
    Expired { on: NaiveDate },
    ExpiresSoon { days: i64 },
    Valid { until: NaiveDate },
}

impl ExpiryStatus {
    /// Classifies `expiry` against `today`; dates within `warning_days` count as
    /// expiring soon.
    pub fn classify(expiry: Option<NaiveDate>, today: NaiveDate, warning_days: i64) -> Self {
        match expiry {
            None => ExpiryStatus::NoExpiry,
            Some(on) if on < today => ExpiryStatus::Expired { on },
            Some(on) => {
                let days = (on - today).num_days();
                if days <= warning_days {
                    ExpiryStatus::ExpiresSoon { days }
                } else {
                    ExpiryStatus::Valid { until: on }
                }
            }
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryStatus::NoExpiry => f.write_str("no expiry"),
            ExpiryStatus::Expired { .. } => f.write_str("expired"),
            ExpiryStatus::ExpiresSoon { days: 1 } => f.write_str("expires in 1 day"),
            ExpiryStatus::ExpiresSoon { days } => write!(f, "expires in {} days", days),
            ExpiryStatus::Valid { until } => write!(f, "valid until {}", until.format("%Y-%m-%d")),
        }
    }
}

/// What the presentation layer should offer for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellAffordance {
    Upload,
    View { files: usize },
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    /// Id of the canonical (primary) type of the column.
    pub type_id: String,
    pub document_id: Option<String>,
    pub affordance: CellAffordance,
    pub matched_via: Option<MatchPath>,
    pub expiry: Option<ExpiryStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub job_role: Option<String>,
    /// Percentage of canonical types satisfied, 0 to 100.
    pub completion: u8,
    pub cells: Vec<MatrixCell>,
}

/// A column of the matrix: the canonical representative of merged types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeColumn {
    pub type_id: String,
    pub name: String,
    pub is_required: bool,
    /// Every catalog id merged into this column.
    pub group_ids: Vec<String>,
}

/// A document whose type could not be recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyEntry {
    pub document_id: String,
    pub employee_id: String,
    pub document_type_id: String,
    pub files: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixView {
    pub types: Vec<TypeColumn>,
    pub rows: Vec<MatrixRow>,
    /// Documents shown under the synthetic "Legacy" type.
    pub legacy: Vec<LegacyEntry>,
    /// User-facing messages about data that could not be loaded.
    pub warnings: Vec<String>,
}
