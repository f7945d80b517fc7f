use crate::error::AppError;
use crate::services::AppContext;
use crate::store::{kinds, EntityStoreExt};
use actix_web::{web, HttpResponse};
use common::model::employee::{Employee, OrgChartNode};
use log::warn;
use std::collections::{HashMap, HashSet};

pub(super) async fn get_org_chart(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let employees: Vec<Employee> = ctx.store.list_as(kinds::EMPLOYEE, None)?;
    Ok(HttpResponse::Ok().json(build_org_chart(&employees)))
}

/// Manager tree of the active employees.
///
/// Roots are employees without a manager, or whose manager is unknown, inactive
/// or themselves. Siblings are ordered by `(full_name, id)`. Employees caught in a
/// reporting cycle are reached from no root; the cycle is cut at its first member
/// in that order, which becomes a root.
pub fn build_org_chart(employees: &[Employee]) -> Vec<OrgChartNode> {
    let mut active: Vec<&Employee> = employees.iter().filter(|e| e.is_active).collect();
    active.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.id.cmp(&b.id)));

    let rank: HashMap<&str, usize> = active
        .iter()
        .enumerate()
        .map(|(position, e)| (e.id.as_str(), position))
        .collect();
    let mut reports: HashMap<&str, Vec<&Employee>> = HashMap::new();
    let mut roots = Vec::new();
    for &employee in &active {
        match employee.manager_id.as_deref() {
            Some(manager) if manager != employee.id && rank.contains_key(manager) => {
                reports.entry(manager).or_default().push(employee)
            }
            _ => roots.push(employee),
        }
    }

    let mut visited = HashSet::new();
    let mut chart: Vec<OrgChartNode> = roots
        .into_iter()
        .map(|root| subtree(root, &reports, &mut visited))
        .collect();

    // Whatever is left hangs below a cycle.
    for &employee in &active {
        if visited.contains(employee.id.as_str()) {
            continue;
        }
        let root = cycle_root(employee, &active, &rank);
        warn!(
            "reporting cycle through employee {} ({}); shown as a root",
            root.id, root.full_name
        );
        chart.push(subtree(root, &reports, &mut visited));
    }
    chart
}

/// Follows manager links up from `start` until they loop and returns the loop
/// member that sorts first.
fn cycle_root<'a>(
    start: &'a Employee,
    active: &[&'a Employee],
    rank: &HashMap<&str, usize>,
) -> &'a Employee {
    let mut walk: Vec<usize> = Vec::new();
    let mut current = rank.get(start.id.as_str()).copied();
    while let Some(position) = current {
        if let Some(loop_start) = walk.iter().position(|&seen| seen == position) {
            let first = walk[loop_start..].iter().copied().min().unwrap_or(position);
            return active[first];
        }
        walk.push(position);
        current = active[position]
            .manager_id
            .as_deref()
            .and_then(|manager| rank.get(manager).copied());
    }
    start
}

fn subtree<'a>(
    employee: &'a Employee,
    reports: &HashMap<&str, Vec<&'a Employee>>,
    visited: &mut HashSet<&'a str>,
) -> OrgChartNode {
    visited.insert(employee.id.as_str());
    let mut node = OrgChartNode {
        employee_id: employee.id.clone(),
        full_name: employee.full_name.clone(),
        job_role: employee.job_role.clone(),
        reports: Vec::new(),
    };
    for &report in reports.get(employee.id.as_str()).into_iter().flatten() {
        if !visited.contains(report.id.as_str()) {
            node.reports.push(subtree(report, reports, visited));
        }
    }
    node
}
