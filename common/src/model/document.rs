use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A document record tying zero or more uploaded files to one employee and one
/// document type.
///
/// Stored records written by older clients carry a single `file_url`/`file_name`
/// pair instead of the arrays. Those are folded into `file_urls`/`file_names` while
/// deserializing, so the rest of the code only ever sees the plural shape and
/// `file_urls.len() == file_names.len()` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredDocument")]
pub struct EmployeeDocument {
    pub id: String,
    pub employee_id: String,
    pub document_type_id: String,
    pub file_urls: Vec<String>,
    pub file_names: Vec<String>,
    pub expiry_date: Option<NaiveDate>,
    pub is_not_applicable: bool,
    pub notes: Option<String>,
    pub upload_date: Option<DateTime<Utc>>,
    pub last_updated_date: Option<DateTime<Utc>>,
}

impl EmployeeDocument {
    pub fn file_count(&self) -> usize {
        self.file_urls.len()
    }

    pub fn has_files(&self) -> bool {
        !self.file_urls.is_empty()
    }

    /// A document satisfies its type once something was uploaded or the type was
    /// explicitly marked as not applicable for the employee.
    pub fn is_complete(&self) -> bool {
        self.has_files() || self.is_not_applicable
    }
}

/// Wire shape of a document as found in the store, legacy fields included.
#[derive(Deserialize)]
struct StoredDocument {
    id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    employee_id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    document_type_id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    file_urls: Vec<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    file_names: Vec<String>,
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    expiry_date: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    is_not_applicable: bool,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    last_updated_date: Option<DateTime<Utc>>,
}

impl From<StoredDocument> for EmployeeDocument {
    fn from(stored: StoredDocument) -> Self {
        let mut file_urls = stored.file_urls;
        let mut file_names = stored.file_names;
        if file_urls.is_empty() {
            file_urls.extend(stored.file_url.filter(|url| !url.trim().is_empty()));
        }
        if file_names.is_empty() {
            file_names.extend(stored.file_name.filter(|name| !name.trim().is_empty()));
        }
        file_names.truncate(file_urls.len());
        for url in &file_urls[file_names.len()..] {
            file_names.push(name_from_url(url));
        }

        EmployeeDocument {
            id: stored.id,
            employee_id: stored.employee_id,
            document_type_id: stored.document_type_id,
            file_urls,
            file_names,
            expiry_date: stored.expiry_date.as_deref().and_then(parse_expiry),
            is_not_applicable: stored.is_not_applicable,
            notes: stored.notes,
            upload_date: stored.upload_date,
            last_updated_date: stored.last_updated_date,
        }
    }
}

/// Last path segment of a URL, without query string.
fn name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// Expiry dates were written both as plain dates and as full timestamps.
/// Blank or unparseable values mean "no expiry".
fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
