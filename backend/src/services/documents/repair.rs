//! `POST /api/documents/repair[?force=true]`
//!
//! Rewrites the type id of every document the matrix currently rescues by name,
//! see [`crate::reconcile::repair`]. Unlike the matrix, a repair refuses to run on
//! a partial load: any failed collection aborts it.

use crate::error::AppError;
use crate::reconcile::repair::{self, RepairOutcome, RepairThrottle};
use crate::reconcile::ReconciliationSnapshot;
use crate::services::AppContext;
use crate::store::{kinds, EntityStoreExt};
use actix_web::{web, HttpResponse};
use common::model::document::EmployeeDocument;
use common::model::document_type::{DocumentCatalog, DocumentType};
use common::requests::RepairQuery;
use log::info;

pub(super) async fn process(
    ctx: web::Data<AppContext>,
    query: web::Query<RepairQuery>,
) -> Result<HttpResponse, AppError> {
    let throttle = RepairThrottle::new(
        ctx.clock.as_ref(),
        ctx.state.as_ref(),
        ctx.config.repair_ttl,
    );
    if !query.force && !throttle.is_due()? {
        let last_run = throttle.last_run()?;
        info!(target: "reconcile", "repair skipped, last run at {:?}", last_run);
        return Ok(HttpResponse::Ok().json(RepairOutcome {
            skipped: true,
            last_run,
            repaired: Vec::new(),
        }));
    }

    let employee_types: Vec<DocumentType> = ctx
        .store
        .list_as(DocumentCatalog::Employee.entity_kind(), None)?;
    let client_types: Vec<DocumentType> = ctx
        .store
        .list_as(DocumentCatalog::Client.entity_kind(), None)?;
    let documents: Vec<EmployeeDocument> = ctx.store.list_as(kinds::EMPLOYEE_DOCUMENT, None)?;
    let snapshot = ReconciliationSnapshot::build(&employee_types, &client_types, documents);

    let repaired = repair::plan(&snapshot);
    repair::apply(ctx.store.as_ref(), &repaired)?;
    let last_run = throttle.record_run()?;
    info!(
        target: "reconcile",
        "repair finished: {} document(s) rewritten",
        repaired.len()
    );

    Ok(HttpResponse::Ok().json(RepairOutcome {
        skipped: false,
        last_run: Some(last_run),
        repaired,
    }))
}

#[cfg(test)]
mod tests {
    use crate::services::documents::configure_routes;
    use crate::services::testing;
    use crate::store::{kinds, to_record, EntityStore};
    use actix_web::{test, web, App};
    use common::model::document_type::DocumentCatalog;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn repairs_once_then_throttles_until_forced() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, store) = testing::context(dir.path());
        let now = ctx.clock.now();
        for (kind, fields) in [
            (
                DocumentCatalog::Employee.entity_kind(),
                json!({ "id": "t1", "name": "Passport", "sort_order": 1 }),
            ),
            (
                DocumentCatalog::Client.entity_kind(),
                json!({ "id": "c1", "name": "passport " }),
            ),
            (
                kinds::EMPLOYEE_DOCUMENT,
                json!({ "id": "d1", "employee_id": "e1", "document_type_id": "c1",
                        "file_urls": ["/files/public/p.png"], "file_names": ["p.png"] }),
            ),
        ] {
            store.create(kind, to_record(&fields).unwrap()).unwrap();
        }
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/documents/repair").to_request();
        let outcome: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(outcome["skipped"], json!(false));
        assert_eq!(outcome["repaired"][0]["document_id"], json!("d1"));
        assert_eq!(outcome["repaired"][0]["to_type_id"], json!("t1"));
        assert_eq!(outcome["last_run"], json!(now));
        let stored = store.get(kinds::EMPLOYEE_DOCUMENT, "d1").unwrap();
        assert_eq!(stored["document_type_id"], json!("t1"));

        let req = test::TestRequest::post().uri("/api/documents/repair").to_request();
        let outcome: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(outcome["skipped"], json!(true));

        let req = test::TestRequest::post()
            .uri("/api/documents/repair?force=true")
            .to_request();
        let outcome: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(outcome["skipped"], json!(false));
        assert_eq!(outcome["repaired"], json!([]));
    }
}
