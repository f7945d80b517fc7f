use super::normalize;
use common::model::document_type::DocumentType;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Canonical representative of every catalog entry sharing a normalized name.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedType {
    pub primary: DocumentType,
    /// Ids of all merged entries, the primary's included.
    pub group_ids: BTreeSet<String>,
}

impl MergedType {
    pub fn contains(&self, type_id: &str) -> bool {
        self.group_ids.contains(type_id)
    }

    pub fn normalized_name(&self) -> String {
        normalize(self.primary.name.as_str())
    }

    pub fn is_required(&self) -> bool {
        self.primary.is_required.unwrap_or(false)
    }
}

/// Display order; the id only breaks ties between otherwise identical entries.
fn display_order(a: &DocumentType, b: &DocumentType) -> Ordering {
    a.sort_key()
        .cmp(&b.sort_key())
        .then_with(|| a.id.cmp(&b.id))
}

/// Merges catalog entries by normalized name.
///
/// Entries with an empty name are dropped. Within a group the entry with the
/// lowest `(sort_order, name)` becomes the primary; the result is ordered by the
/// primaries' `(sort_order, name)`. Merging is silent: two spellings of the same
/// name with different sort orders are not treated as a conflict.
pub fn group_types(types: &[DocumentType]) -> Vec<MergedType> {
    let mut groups: HashMap<String, Vec<&DocumentType>> = HashMap::new();
    for doc_type in types {
        let key = normalize(doc_type.name.as_str());
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().push(doc_type);
    }

    let mut merged: Vec<MergedType> = groups
        .into_values()
        .filter_map(|mut members| {
            members.sort_by(|a, b| display_order(a, b));
            let (primary, _) = members.split_first()?;
            Some(MergedType {
                primary: (*primary).clone(),
                group_ids: members.iter().map(|t| t.id.clone()).collect(),
            })
        })
        .collect();
    merged.sort_by(|a, b| display_order(&a.primary, &b.primary));
    merged
}
