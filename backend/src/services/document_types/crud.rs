use crate::error::AppError;
use crate::services::validate::{optional_text, required_text};
use crate::services::AppContext;
use crate::store::EntityStoreExt;
use actix_web::{web, HttpResponse};
use common::model::document_type::{DocumentCatalog, DocumentType};
use common::requests::DocumentTypeInput;
use log::info;

pub(super) async fn list(
    ctx: web::Data<AppContext>,
    catalog: web::Path<DocumentCatalog>,
) -> Result<HttpResponse, AppError> {
    let types: Vec<DocumentType> = ctx
        .store
        .list_as(catalog.entity_kind(), Some("sort_order"))?;
    Ok(HttpResponse::Ok().json(types))
}

pub(super) async fn get(
    ctx: web::Data<AppContext>,
    path: web::Path<(DocumentCatalog, String)>,
) -> Result<HttpResponse, AppError> {
    let (catalog, id) = path.into_inner();
    let doc_type: DocumentType = ctx.store.get_as(catalog.entity_kind(), &id)?;
    Ok(HttpResponse::Ok().json(doc_type))
}

pub(super) async fn create(
    ctx: web::Data<AppContext>,
    catalog: web::Path<DocumentCatalog>,
    payload: web::Json<DocumentTypeInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = payload.into_inner();
    input.name = Some(required_text(input.name.as_deref(), "name")?);

    let doc_type: DocumentType = ctx.store.create_from(catalog.entity_kind(), &input)?;
    info!(
        "created {} document type {} ({})",
        catalog, doc_type.id, doc_type.name
    );
    Ok(HttpResponse::Created().json(doc_type))
}

pub(super) async fn update(
    ctx: web::Data<AppContext>,
    path: web::Path<(DocumentCatalog, String)>,
    payload: web::Json<DocumentTypeInput>,
) -> Result<HttpResponse, AppError> {
    let (catalog, id) = path.into_inner();
    let mut input = payload.into_inner();
    input.name = optional_text(input.name.as_deref(), "name")?;

    let doc_type: DocumentType = ctx.store.update_from(catalog.entity_kind(), &id, &input)?;
    Ok(HttpResponse::Ok().json(doc_type))
}

pub(super) async fn remove(
    ctx: web::Data<AppContext>,
    path: web::Path<(DocumentCatalog, String)>,
) -> Result<HttpResponse, AppError> {
    let (catalog, id) = path.into_inner();
    ctx.store.delete(catalog.entity_kind(), &id)?;
    info!("deleted {} document type {}", catalog, id);
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use crate::services::document_types::configure_routes;
    use crate::services::testing;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use common::model::document_type::DocumentType;
    use serde_json::json;

    #[actix_web::test]
    async fn catalogs_are_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _store) = testing::context(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        for (catalog, name, order) in [
            ("employee", "Visa", 2),
            ("employee", "Passport", 1),
            ("client", "Site induction", 1),
        ] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/document_types/{}", catalog))
                .set_json(json!({ "name": name, "sort_order": order, "is_required": true }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/document_types/employee")
            .to_request();
        let employee: Vec<DocumentType> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = employee.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Passport", "Visa"]);

        let req = test::TestRequest::get()
            .uri("/api/document_types/client")
            .to_request();
        let client: Vec<DocumentType> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(client.len(), 1);

        // An employee type id is unknown in the client catalog.
        let req = test::TestRequest::delete()
            .uri(&format!("/api/document_types/client/{}", employee[0].id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_catalog_and_missing_name() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _store) = testing::context(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/document_types/vendor")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/document_types/employee")
            .set_json(json!({ "sort_order": 1 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
