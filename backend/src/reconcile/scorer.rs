use super::{resolve, MergedType, OrphanIndex};
use common::model::document::EmployeeDocument;

/// Share of `types` the employee has satisfied, as a whole percentage.
///
/// A type is satisfied when its resolved document has at least one file or is
/// marked not applicable. No types means 0, not 100.
pub fn completion_percentage(
    employee_id: &str,
    types: &[MergedType],
    documents: &[EmployeeDocument],
    orphans: &OrphanIndex,
) -> u8 {
    let own: Vec<&EmployeeDocument> = documents
        .iter()
        .filter(|d| d.employee_id == employee_id)
        .collect();
    let completed = types
        .iter()
        .filter(|merged| {
            resolve(own.iter().copied(), merged, orphans)
                .is_some_and(|found| found.document.is_complete())
        })
        .count();
    percentage(completed, types.len())
}

/// `round(100 * done / total)` with halves rounded up, 0 when `total` is 0.
pub fn percentage(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    ((200 * done + total) / (2 * total)) as u8
}
