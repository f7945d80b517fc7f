use crate::error::AppError;
use crate::reconcile::{MergedType, ReconciliationSnapshot, Resolution};
use crate::services::loader::LoadedData;
use crate::services::AppContext;
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use common::model::employee::Employee;
use common::model::matrix::{
    CellAffordance, ExpiryStatus, LegacyEntry, MatrixCell, MatrixRow, MatrixView, TypeColumn,
};
use log::debug;
use rayon::prelude::*;

pub(super) async fn process(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let view = load_view(ctx).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Loads everything and builds the matrix off the async workers.
pub(crate) async fn load_view(ctx: web::Data<AppContext>) -> Result<MatrixView, AppError> {
    web::block(move || {
        let today = ctx.clock.now().date_naive();
        build_view(LoadedData::load(&ctx), today, ctx.config.expiry_warning_days)
    })
    .await
    .map_err(AppError::internal)
}

/// Rows follow the order of `data.employees`; columns follow the merged types.
pub(crate) fn build_view(data: LoadedData, today: NaiveDate, warning_days: i64) -> MatrixView {
    let (snapshot, employees, warnings) = data.into_snapshot();
    let orphans = snapshot.orphans();
    if !orphans.is_empty() {
        debug!(
            target: "reconcile",
            "{} orphaned type id(s): {}",
            orphans.len(),
            orphans.orphan_ids().collect::<Vec<_>>().join(", ")
        );
    }

    let types = snapshot
        .types()
        .iter()
        .map(|merged| TypeColumn {
            type_id: merged.primary.id.clone(),
            name: merged.primary.name.clone(),
            is_required: merged.is_required(),
            group_ids: merged.group_ids.iter().cloned().collect(),
        })
        .collect();

    let rows = employees
        .par_iter()
        .map(|employee| build_row(&snapshot, employee, today, warning_days))
        .collect();

    let legacy = snapshot
        .legacy()
        .into_iter()
        .map(|document| LegacyEntry {
            document_id: document.id.clone(),
            employee_id: document.employee_id.clone(),
            document_type_id: document.document_type_id.clone(),
            files: document.file_count(),
        })
        .collect();

    MatrixView {
        types,
        rows,
        legacy,
        warnings,
    }
}

fn build_row(
    snapshot: &ReconciliationSnapshot,
    employee: &Employee,
    today: NaiveDate,
    warning_days: i64,
) -> MatrixRow {
    MatrixRow {
        employee_id: employee.id.clone(),
        full_name: employee.full_name.clone(),
        email: employee.email.clone(),
        job_role: employee.job_role.clone(),
        completion: snapshot.completion(&employee.id),
        cells: snapshot
            .types()
            .iter()
            .map(|merged| build_cell(snapshot, &employee.id, merged, today, warning_days))
            .collect(),
    }
}

fn build_cell(
    snapshot: &ReconciliationSnapshot,
    employee_id: &str,
    merged: &MergedType,
    today: NaiveDate,
    warning_days: i64,
) -> MatrixCell {
    let type_id = merged.primary.id.clone();
    let Some(Resolution { document, path }) = snapshot.resolve(employee_id, merged) else {
        return MatrixCell {
            type_id,
            document_id: None,
            affordance: CellAffordance::Upload,
            matched_via: None,
            expiry: None,
        };
    };

    let (affordance, expiry) = if document.has_files() {
        (
            CellAffordance::View {
                files: document.file_count(),
            },
            Some(ExpiryStatus::classify(
                document.expiry_date,
                today,
                warning_days,
            )),
        )
    } else if document.is_not_applicable {
        (CellAffordance::NotApplicable, None)
    } else {
        (CellAffordance::Upload, None)
    };

    MatrixCell {
        type_id,
        document_id: Some(document.id.clone()),
        affordance,
        matched_via: Some(path),
        expiry,
    }
}
