//! Loads everything the matrix, the CSV export and reports are built from.
//!
//! Each collection is loaded on its own. A failed load degrades that collection to
//! an empty list and records a warning for the user instead of failing the whole
//! view.

use super::AppContext;
use crate::reconcile::ReconciliationSnapshot;
use crate::store::{kinds, EntityStore, EntityStoreExt};
use common::model::document::EmployeeDocument;
use common::model::document_type::{DocumentCatalog, DocumentType};
use common::model::employee::Employee;
use log::error;
use serde::de::DeserializeOwned;

pub(crate) struct LoadedData {
    pub employees: Vec<Employee>,
    pub employee_types: Vec<DocumentType>,
    pub client_types: Vec<DocumentType>,
    pub documents: Vec<EmployeeDocument>,
    pub warnings: Vec<String>,
}

impl LoadedData {
    pub fn load(ctx: &AppContext) -> Self {
        Self::load_from(ctx.store.as_ref())
    }

    pub fn load_from(store: &dyn EntityStore) -> Self {
        let mut warnings = Vec::new();
        let mut employees: Vec<Employee> =
            load_or_warn(store, kinds::EMPLOYEE, "employees", &mut warnings);
        employees.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.id.cmp(&b.id)));

        LoadedData {
            employees,
            employee_types: load_or_warn(
                store,
                DocumentCatalog::Employee.entity_kind(),
                "employee document types",
                &mut warnings,
            ),
            client_types: load_or_warn(
                store,
                DocumentCatalog::Client.entity_kind(),
                "client document types",
                &mut warnings,
            ),
            documents: load_or_warn(store, kinds::EMPLOYEE_DOCUMENT, "documents", &mut warnings),
            warnings,
        }
    }

    /// Splits into the reconciliation snapshot and what is left.
    pub fn into_snapshot(self) -> (ReconciliationSnapshot, Vec<Employee>, Vec<String>) {
        let snapshot =
            ReconciliationSnapshot::build(&self.employee_types, &self.client_types, self.documents);
        (snapshot, self.employees, self.warnings)
    }
}

fn load_or_warn<T: DeserializeOwned>(
    store: &dyn EntityStore,
    kind: &str,
    label: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    match store.list_as(kind, None) {
        Ok(records) => records,
        Err(err) => {
            error!("failed to load {}: {}", label, err);
            warnings.push(format!("Could not load {}; they are left out of this view.", label));
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{to_record, Record, SqliteStore, StoreError};
    use serde_json::json;

    /// Delegates to an in-memory store but fails every listing of one kind.
    struct FailingKind {
        inner: SqliteStore,
        failing: &'static str,
    }

    impl EntityStore for FailingKind {
        fn list(
            &self,
            kind: &str,
            sort_key: Option<&str>,
            limit: Option<usize>,
        ) -> Result<Vec<Record>, StoreError> {
            if kind == self.failing {
                return Err(StoreError::Poisoned);
            }
            self.inner.list(kind, sort_key, limit)
        }

        fn filter(&self, kind: &str, criteria: &Record) -> Result<Vec<Record>, StoreError> {
            self.inner.filter(kind, criteria)
        }

        fn get(&self, kind: &str, id: &str) -> Result<Record, StoreError> {
            self.inner.get(kind, id)
        }

        fn create(&self, kind: &str, fields: Record) -> Result<Record, StoreError> {
            self.inner.create(kind, fields)
        }

        fn bulk_create(&self, kind: &str, fields: Vec<Record>) -> Result<Vec<Record>, StoreError> {
            self.inner.bulk_create(kind, fields)
        }

        fn update(&self, kind: &str, id: &str, fields: Record) -> Result<Record, StoreError> {
            self.inner.update(kind, id, fields)
        }

        fn delete(&self, kind: &str, id: &str) -> Result<(), StoreError> {
            self.inner.delete(kind, id)
        }
    }

    fn seeded(failing: &'static str) -> FailingKind {
        let inner = SqliteStore::open_in_memory().unwrap();
        for (kind, record) in [
            (kinds::EMPLOYEE, json!({ "id": "e2", "full_name": "Bruno", "email": "b@example.com" })),
            (kinds::EMPLOYEE, json!({ "id": "e1", "full_name": "Ana", "email": "a@example.com" })),
            (DocumentCatalog::Employee.entity_kind(), json!({ "id": "t1", "name": "Passport" })),
            (DocumentCatalog::Client.entity_kind(), json!({ "id": "c1", "name": "Visa" })),
            (
                kinds::EMPLOYEE_DOCUMENT,
                json!({ "id": "d1", "employee_id": "e1", "document_type_id": "t1" }),
            ),
        ] {
            inner.create(kind, to_record(&record).unwrap()).unwrap();
        }
        FailingKind { inner, failing }
    }

    #[test]
    fn a_failed_catalog_degrades_to_an_empty_list_with_a_warning() {
        let store = seeded(DocumentCatalog::Client.entity_kind());
        let data = LoadedData::load_from(&store);

        assert!(data.client_types.is_empty());
        assert_eq!(
            data.warnings,
            ["Could not load client document types; they are left out of this view."]
        );
        let names: Vec<&str> = data.employees.iter().map(|e| e.full_name.as_str()).collect();
        assert_eq!(names, ["Ana", "Bruno"]);
        assert_eq!(data.employee_types.len(), 1);
        assert_eq!(data.documents.len(), 1);
    }

    #[test]
    fn failed_documents_still_build_a_snapshot() {
        let store = seeded(kinds::EMPLOYEE_DOCUMENT);
        let (snapshot, employees, warnings) = LoadedData::load_from(&store).into_snapshot();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("documents"));
        assert_eq!(employees.len(), 2);
        assert_eq!(snapshot.types().len(), 1);
        assert_eq!(snapshot.completion("e1"), 0);
    }
}
