use super::{MergedType, OrphanIndex};
use common::model::document::EmployeeDocument;
use common::model::matrix::MatchPath;
use log::debug;

/// The document found for a cell and how it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub document: &'a EmployeeDocument,
    pub path: MatchPath,
}

/// Finds the document satisfying `merged` among one employee's documents.
///
/// The first document linked directly to one of the merged ids wins. Only when
/// there is none does the first orphan whose secondary-catalog name matches the
/// type's name count. Every orphan match is logged under the `reconcile` target.
pub fn resolve<'a, I>(documents: I, merged: &MergedType, orphans: &OrphanIndex) -> Option<Resolution<'a>>
where
    I: IntoIterator<Item = &'a EmployeeDocument>,
{
    let wanted = merged.normalized_name();
    let mut rescued: Option<&'a EmployeeDocument> = None;

    for document in documents {
        let type_id = document.document_type_id.as_str();
        if merged.contains(type_id) {
            return Some(Resolution {
                document,
                path: MatchPath::Direct,
            });
        }
        if rescued.is_none()
            && !wanted.is_empty()
            && orphans.is_orphan(type_id)
            && orphans.resolved_name(type_id) == Some(wanted.as_str())
        {
            rescued = Some(document);
        }
    }

    rescued.map(|document| {
        debug!(
            target: "reconcile",
            "orphan match: employee_id={} document_id={} orphan_type_id={} canonical_type_id={} name={:?}",
            document.employee_id,
            document.id,
            document.document_type_id,
            merged.primary.id,
            wanted
        );
        Resolution {
            document,
            path: MatchPath::Orphan,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::fixtures::{doc_type, document};
    use crate::reconcile::group_types;
    use chrono::{TimeZone, Utc};

    #[test]
    fn direct_link_beats_a_newer_orphan() {
        let types = group_types(&[doc_type("t1", "Passport", Some(1))]);
        let secondary = vec![doc_type("orphan1", "passport", None)];

        let mut orphan = document("d-orphan", "e1", "orphan1", &["new.png"]);
        orphan.last_updated_date = Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());
        let mut direct = document("d-direct", "e1", "t1", &[]);
        direct.last_updated_date = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let documents = vec![orphan, direct];

        let index = OrphanIndex::build(&documents, &types, &secondary);
        let found = resolve(&documents, &types[0], &index).unwrap();
        assert_eq!(found.document.id, "d-direct");
        assert_eq!(found.path, MatchPath::Direct);
    }

    #[test]
    fn orphan_is_rescued_by_secondary_name() {
        let types = group_types(&[doc_type("t9", "Passport", Some(1))]);
        let secondary = vec![doc_type("orphan1", "passport ", None)];
        let documents = vec![document("d1", "e1", "orphan1", &["scan.pdf"])];

        let index = OrphanIndex::build(&documents, &types, &secondary);
        let found = resolve(&documents, &types[0], &index).unwrap();
        assert_eq!(found.document.id, "d1");
        assert_eq!(found.path, MatchPath::Orphan);
    }

    #[test]
    fn any_member_id_of_a_merged_type_matches_directly() {
        let types = group_types(&[doc_type("t1", "ID", Some(1)), doc_type("t2", "id", Some(2))]);
        let documents = vec![document("d1", "e1", "t2", &["a.png"])];
        let index = OrphanIndex::build(&documents, &types, &[]);
        let found = resolve(&documents, &types[0], &index).unwrap();
        assert_eq!(found.path, MatchPath::Direct);
    }

    #[test]
    fn unrelated_or_nameless_orphans_do_not_match() {
        let types = group_types(&[doc_type("t1", "Passport", Some(1))]);
        let secondary = vec![doc_type("o1", "Visa", None)];
        let documents = vec![
            document("d1", "e1", "o1", &["a.png"]),
            document("d2", "e1", "o2", &["b.png"]),
        ];
        let index = OrphanIndex::build(&documents, &types, &secondary);
        assert!(resolve(&documents, &types[0], &index).is_none());
    }

    #[test]
    fn no_documents_resolve_to_nothing() {
        let types = group_types(&[doc_type("t1", "Passport", Some(1))]);
        let index = OrphanIndex::default();
        assert!(resolve(&[], &types[0], &index).is_none());
    }
}
