//! CSV rendering of the document matrix.
//!
//! Header: `Employee, Email, Job Role` followed by one column per merged type.
//! Cells read `"{n} files ({expiry})"`, `"N/A"` or `"No files"`. The output only
//! depends on the loaded data and the reference day, so two exports of the same
//! snapshot on the same day are byte-identical.

use super::build::load_view;
use crate::error::AppError;
use crate::services::AppContext;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use common::model::matrix::{CellAffordance, ExpiryStatus, MatrixCell, MatrixView};

pub(super) async fn process(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let today = ctx.clock.now().date_naive();
    let view = load_view(ctx).await?;
    let body = render_csv(&view).map_err(AppError::internal)?;

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(format!(
            "document-matrix-{}.csv",
            today.format("%Y-%m-%d")
        ))],
    };
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(disposition)
        .body(body))
}

pub(crate) fn render_csv(view: &MatrixView) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "Employee".to_string(),
        "Email".to_string(),
        "Job Role".to_string(),
    ];
    header.extend(view.types.iter().map(|column| column.name.clone()));
    writer.write_record(&header)?;

    for row in &view.rows {
        let mut record = vec![
            row.full_name.clone(),
            row.email.clone(),
            row.job_role.clone().unwrap_or_default(),
        ];
        record.extend(row.cells.iter().map(cell_text));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

pub(crate) fn cell_text(cell: &MatrixCell) -> String {
    match cell.affordance {
        CellAffordance::View { files } => format!(
            "{} files ({})",
            files,
            cell.expiry.unwrap_or(ExpiryStatus::NoExpiry)
        ),
        CellAffordance::NotApplicable => "N/A".to_string(),
        CellAffordance::Upload => "No files".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::matrix::build::build_view;
    use crate::services::matrix::build::tests::sample_data;
    use crate::services::matrix::configure_routes;
    use crate::services::testing;
    use crate::store::{kinds, to_record, EntityStore};
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::App;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn renders_expected_rows() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let csv = render_csv(&build_view(sample_data(), today, 30)).unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(
            text,
            "Employee,Email,Job Role,Passport,Visa\n\
             Ana Perez,e1@example.com,Technician,2 files (expires in 10 days),No files\n\
             Bruno Diaz,e2@example.com,Technician,1 files (no expiry),N/A\n"
        );
    }

    #[test]
    fn export_is_byte_identical_across_runs() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let first = render_csv(&build_view(sample_data(), today, 30)).unwrap();
        let second = render_csv(&build_view(sample_data(), today, 30)).unwrap();
        assert_eq!(first, second);
    }

    #[actix_web::test]
    async fn download_is_an_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, store) = testing::context(dir.path());
        store
            .create(
                kinds::EMPLOYEE,
                to_record(&json!({ "id": "e1", "full_name": "Ana, Perez", "email": "ana@example.com" }))
                    .unwrap(),
            )
            .unwrap();
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        let req = actix_web::test::TestRequest::get()
            .uri("/api/matrix/export.csv")
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        let disposition = resp.headers().get("content-disposition").unwrap();
        assert!(disposition
            .to_str()
            .unwrap()
            .contains("document-matrix-2026-01-10.csv"));

        let body = actix_web::test::read_body(resp).await;
        assert_eq!(
            body.as_ref(),
            b"Employee,Email,Job Role\n\"Ana, Perez\",ana@example.com,\n"
        );
    }
}
