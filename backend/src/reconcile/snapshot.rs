use super::{completion_percentage, group_types, resolve, MergedType, OrphanIndex, Resolution};
use common::model::document::EmployeeDocument;
use common::model::document_type::DocumentType;
use common::model::matrix::MatchPath;
use std::collections::{HashMap, HashSet};

/// Derived lookup structures for one load of catalogs and documents.
///
/// Nothing here outlives the load that built it; rebuild after any change.
#[derive(Debug, Clone)]
pub struct ReconciliationSnapshot {
    types: Vec<MergedType>,
    orphans: OrphanIndex,
    documents: Vec<EmployeeDocument>,
    by_employee: HashMap<String, Vec<usize>>,
}

impl ReconciliationSnapshot {
    /// `employee_types` is the canonical catalog, `client_types` the secondary one
    /// used to name orphaned type ids.
    pub fn build(
        employee_types: &[DocumentType],
        client_types: &[DocumentType],
        documents: Vec<EmployeeDocument>,
    ) -> Self {
        let types = group_types(employee_types);
        let orphans = OrphanIndex::build(&documents, &types, client_types);
        let mut by_employee: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, document) in documents.iter().enumerate() {
            by_employee
                .entry(document.employee_id.clone())
                .or_default()
                .push(position);
        }
        ReconciliationSnapshot {
            types,
            orphans,
            documents,
            by_employee,
        }
    }

    pub fn types(&self) -> &[MergedType] {
        &self.types
    }

    pub fn orphans(&self) -> &OrphanIndex {
        &self.orphans
    }

    /// One employee's documents, in load order.
    pub fn documents_for<'a>(&'a self, employee_id: &str) -> impl Iterator<Item = &'a EmployeeDocument> + Clone + 'a {
        self.by_employee
            .get(employee_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&position| &self.documents[position])
    }

    pub fn resolve(&self, employee_id: &str, merged: &MergedType) -> Option<Resolution<'_>> {
        resolve(self.documents_for(employee_id), merged, &self.orphans)
    }

    pub fn completion(&self, employee_id: &str) -> u8 {
        completion_percentage(employee_id, &self.types, &self.documents, &self.orphans)
    }

    /// Documents whose type id is neither canonical nor rescued by name.
    pub fn legacy(&self) -> Vec<&EmployeeDocument> {
        let names: HashSet<String> = self.types.iter().map(MergedType::normalized_name).collect();
        self.documents
            .iter()
            .filter(|document| {
                let type_id = document.document_type_id.as_str();
                self.orphans.is_orphan(type_id)
                    && !self
                        .orphans
                        .resolved_name(type_id)
                        .is_some_and(|name| names.contains(name))
            })
            .collect()
    }

    /// Orphan documents that currently stand in for a canonical type, paired with
    /// that type. Orphans shadowed by a direct link are left out.
    pub fn rescued(&self) -> Vec<(&EmployeeDocument, &MergedType)> {
        let mut employees: Vec<&String> = self.by_employee.keys().collect();
        employees.sort();

        let mut rescued = Vec::new();
        for employee_id in employees {
            for merged in &self.types {
                if let Some(Resolution {
                    document,
                    path: MatchPath::Orphan,
                }) = self.resolve(employee_id, merged)
                {
                    rescued.push((document, merged));
                }
            }
        }
        rescued
    }
}
