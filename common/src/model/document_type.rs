use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback sort position for types that were never given an explicit order.
pub const UNORDERED_SORT_POSITION: i32 = 9999;

/// A catalog entry describing one kind of document (passport, certificate, ...).
///
/// Two parallel catalogs exist, see [`DocumentCatalog`]. Several records may share
/// a name modulo case and whitespace; the backend merges those when building views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DocumentType {
    /// Ordering key used for both group representatives and display order.
    pub fn sort_key(&self) -> (i32, &str) {
        (
            self.sort_order.unwrap_or(UNORDERED_SORT_POSITION),
            self.name.as_str(),
        )
    }
}

/// Which catalog a document type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCatalog {
    /// Documents employees must hold.
    Employee,
    /// Documents attached to clients and their work orders.
    Client,
}

impl DocumentCatalog {
    /// Entity kind under which the catalog is persisted.
    pub fn entity_kind(self) -> &'static str {
        match self {
            DocumentCatalog::Employee => "EmployeeDocumentType",
            DocumentCatalog::Client => "ClientDocumentType",
        }
    }
}

impl fmt::Display for DocumentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentCatalog::Employee => f.write_str("employee"),
            DocumentCatalog::Client => f.write_str("client"),
        }
    }
}
