use super::{normalize, MergedType};
use common::model::document::EmployeeDocument;
use common::model::document_type::DocumentType;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Every type id covered by a merged type.
pub fn known_ids(types: &[MergedType]) -> HashSet<&str> {
    types
        .iter()
        .flat_map(|t| t.group_ids.iter().map(String::as_str))
        .collect()
}

/// Documents referencing type ids outside the canonical catalog.
///
/// For orphan ids that exist in the secondary catalog the normalized name of that
/// entry is kept, which is what lets a document be rescued by name. Ids found in
/// neither catalog have no name and can only be shown under the legacy bucket.
#[derive(Debug, Clone, Default)]
pub struct OrphanIndex {
    orphans: BTreeSet<String>,
    names: HashMap<String, String>,
}

impl OrphanIndex {
    pub fn build(
        documents: &[EmployeeDocument],
        types: &[MergedType],
        secondary: &[DocumentType],
    ) -> Self {
        let known = known_ids(types);
        let orphans: BTreeSet<String> = documents
            .iter()
            .map(|d| d.document_type_id.as_str())
            .filter(|id| !known.contains(id))
            .map(str::to_string)
            .collect();

        let mut names = HashMap::new();
        for entry in secondary {
            if !orphans.contains(&entry.id) || names.contains_key(&entry.id) {
                continue;
            }
            let name = normalize(entry.name.as_str());
            if !name.is_empty() {
                names.insert(entry.id.clone(), name);
            }
        }

        OrphanIndex { orphans, names }
    }

    pub fn is_orphan(&self, type_id: &str) -> bool {
        self.orphans.contains(type_id)
    }

    /// Normalized secondary-catalog name of an orphan id, if it has a usable one.
    pub fn resolved_name(&self, type_id: &str) -> Option<&str> {
        self.names.get(type_id).map(String::as_str)
    }

    pub fn orphan_ids(&self) -> impl Iterator<Item = &str> {
        self.orphans.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }
}
