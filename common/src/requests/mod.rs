//! Request payloads accepted by the backend.
//!
//! Input structs double as partial updates: every field is optional and absent
//! fields are skipped when the payload is turned into a store update.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentTypeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// The `json` part of a document upload. Sent before the `file` parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDocumentMeta {
    pub employee_id: String,
    pub document_type_id: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Store the files behind access control instead of publicly.
    #[serde(default)]
    pub private: bool,
}

/// Metadata edit. `expiry_date: null` clears the date, a missing key leaves it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentRequest {
    #[serde(default, deserialize_with = "present_or_null")]
    pub expiry_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotApplicableRequest {
    pub is_not_applicable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepairQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentListQuery {
    pub employee_id: Option<String>,
}

/// Starts a PDF compliance report, for one employee or for everybody.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartReportRequest {
    #[serde(default)]
    pub employee_id: Option<String>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
