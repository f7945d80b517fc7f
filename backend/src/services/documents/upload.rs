//! `POST /api/documents/upload`
//!
//! The multipart body carries a `json` part with [`UploadDocumentMeta`] followed
//! by one or more `file` parts. The metadata has to arrive first so the request
//! can be rejected before any file is stored. Files are then stored concurrently;
//! their locations keep the order the parts were sent in.
//!
//! An upload lands on the document the matrix shows for the (employee, type) cell,
//! which may be linked through a merged duplicate type or rescued by name. Only
//! when the cell is empty is a new document created.

use crate::error::AppError;
use crate::reconcile::ReconciliationSnapshot;
use crate::services::AppContext;
use crate::store::files::FileStore;
use crate::store::{criteria, kinds, EntityStore, EntityStoreExt, StoreError};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::document::EmployeeDocument;
use common::model::document_type::{DocumentCatalog, DocumentType};
use common::requests::UploadDocumentMeta;
use futures_util::future::try_join_all;
use futures_util::StreamExt;
use log::info;
use serde_json::{json, Value};

pub(super) async fn process(
    ctx: web::Data<AppContext>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (meta, files) = read_parts(payload).await?;
    check_references(ctx.store.as_ref(), &meta)?;

    let uploads = files.into_iter().map(|(file_name, bytes)| {
        if meta.private {
            ctx.files.upload_private_file(file_name, bytes)
        } else {
            ctx.files.upload_file(file_name, bytes)
        }
    });
    let stored = try_join_all(uploads).await?;
    let mut file_urls: Vec<String> = stored.iter().map(|f| f.location.clone()).collect();
    let mut file_names: Vec<String> = stored.into_iter().map(|f| f.file_name).collect();

    let now = ctx.clock.now();
    // Held from the lookup to the write so concurrent uploads to one cell append
    // to a single document.
    let _guard = ctx.uploads.lock().map_err(AppError::internal)?;

    match current_document(ctx.store.as_ref(), &meta)? {
        Some(document) => {
            let added = file_urls.len();
            file_urls.splice(0..0, document.file_urls);
            file_names.splice(0..0, document.file_names);
            let mut fields = json!({
                "file_urls": file_urls,
                "file_names": file_names,
                "is_not_applicable": false,
                "last_updated_date": now,
            });
            if let Some(expiry) = meta.expiry_date {
                fields["expiry_date"] = json!(expiry);
            }
            let updated: EmployeeDocument =
                ctx.store
                    .update_from(kinds::EMPLOYEE_DOCUMENT, &document.id, &fields)?;
            info!(
                "appended {} file(s) to document {} (employee {}, type {})",
                added, updated.id, updated.employee_id, updated.document_type_id
            );
            Ok(HttpResponse::Ok().json(updated))
        }
        None => {
            let fields = json!({
                "employee_id": meta.employee_id,
                "document_type_id": meta.document_type_id,
                "file_urls": file_urls,
                "file_names": file_names,
                "expiry_date": meta.expiry_date,
                "is_not_applicable": false,
                "upload_date": now,
                "last_updated_date": now,
            });
            let created: EmployeeDocument = ctx
                .store
                .create_from(kinds::EMPLOYEE_DOCUMENT, &fields)?;
            info!(
                "created document {} with {} file(s) (employee {}, type {})",
                created.id,
                created.file_count(),
                created.employee_id,
                created.document_type_id
            );
            Ok(HttpResponse::Created().json(created))
        }
    }
}

/// Drains the multipart stream into the metadata and the `(name, bytes)` of
/// every file part, in order.
async fn read_parts(
    mut payload: Multipart,
) -> Result<(UploadDocumentMeta, Vec<(String, Vec<u8>)>), AppError> {
    let mut meta: Option<UploadDocumentMeta> = None;
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("json") => {
                let bytes = read_field(&mut field).await?;
                let parsed: UploadDocumentMeta = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::validation(format!("invalid upload metadata: {}", e)))?;
                meta = Some(parsed);
            }
            Some("file") => {
                if meta.is_none() {
                    return Err(AppError::validation(
                        "the json part must be sent before the files",
                    ));
                }
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if file_name.trim().is_empty() {
                    return Err(AppError::validation("every file part needs a file name"));
                }
                let bytes = read_field(&mut field).await?;
                files.push((file_name, bytes));
            }
            _ => {}
        }
    }

    let meta = meta.ok_or_else(|| AppError::validation("missing json part"))?;
    if meta.employee_id.trim().is_empty() || meta.document_type_id.trim().is_empty() {
        return Err(AppError::validation(
            "employee_id and document_type_id are required",
        ));
    }
    if files.is_empty() {
        return Err(AppError::validation("at least one file is required"));
    }
    Ok((meta, files))
}

async fn read_field(field: &mut actix_multipart::Field) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        bytes.extend_from_slice(&chunk.map_err(malformed)?);
    }
    Ok(bytes)
}

fn malformed(err: actix_multipart::MultipartError) -> AppError {
    AppError::validation(format!("malformed multipart body: {}", err))
}

/// The document currently resolved for the upload's cell, looked up over the
/// merged type containing `document_type_id`.
fn current_document(
    store: &dyn EntityStore,
    meta: &UploadDocumentMeta,
) -> Result<Option<EmployeeDocument>, AppError> {
    let employee_types: Vec<DocumentType> =
        store.list_as(DocumentCatalog::Employee.entity_kind(), None)?;
    let client_types: Vec<DocumentType> =
        store.list_as(DocumentCatalog::Client.entity_kind(), None)?;
    let documents: Vec<EmployeeDocument> = store.filter_as(
        kinds::EMPLOYEE_DOCUMENT,
        &criteria([("employee_id", Value::String(meta.employee_id.clone()))]),
    )?;

    let snapshot = ReconciliationSnapshot::build(&employee_types, &client_types, documents);
    Ok(snapshot
        .types()
        .iter()
        .find(|merged| merged.contains(&meta.document_type_id))
        .and_then(|merged| snapshot.resolve(&meta.employee_id, merged))
        .map(|found| found.document.clone()))
}

/// Uploads are only accepted for known employees and types of the employee catalog.
fn check_references(store: &dyn EntityStore, meta: &UploadDocumentMeta) -> Result<(), AppError> {
    for (kind, id, label) in [
        (kinds::EMPLOYEE, &meta.employee_id, "employee"),
        (
            DocumentCatalog::Employee.entity_kind(),
            &meta.document_type_id,
            "document type",
        ),
    ] {
        match store.get(kind, id) {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(AppError::validation(format!("{} {} does not exist", label, id)))
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::services::documents::configure_routes;
    use crate::services::testing;
    use crate::store::files::PRIVATE_SCHEME;
    use crate::store::{kinds, to_record, EntityStore, EntityStoreExt};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use common::model::document::EmployeeDocument;
    use common::model::document_type::{DocumentCatalog, DocumentType};
    use serde_json::json;

    const BOUNDARY: &str = "staffdocs-boundary";

    enum Part<'a> {
        Json(&'a str),
        File(&'a str, &'a [u8]),
    }

    fn upload_request(parts: &[Part]) -> test::TestRequest {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Json(meta) => {
                    body.extend_from_slice(
                        b"Content-Disposition: form-data; name=\"json\"\r\n\
                          Content-Type: application/json\r\n\r\n",
                    );
                    body.extend_from_slice(meta.as_bytes());
                }
                Part::File(file_name, content) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            file_name
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(content);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        test::TestRequest::post()
            .uri("/api/documents/upload")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    fn seed(store: &dyn EntityStore) {
        store
            .create(
                kinds::EMPLOYEE,
                to_record(&json!({ "id": "e1", "full_name": "Ana", "email": "ana@example.com" }))
                    .unwrap(),
            )
            .unwrap();
        store
            .create(
                DocumentCatalog::Employee.entity_kind(),
                to_record(&json!({ "id": "t1", "name": "Passport" })).unwrap(),
            )
            .unwrap();
    }

    #[actix_web::test]
    async fn creates_then_appends_in_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, store) = testing::context(dir.path());
        seed(store.as_ref());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        let req = upload_request(&[
            Part::Json(r#"{"employee_id":"e1","document_type_id":"t1","expiry_date":"2027-01-31"}"#),
            Part::File("front.png", b"front"),
            Part::File("back.png", b"back"),
        ]);
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: EmployeeDocument = test::read_body_json(resp).await;
        assert_eq!(created.file_names, ["front.png", "back.png"]);
        assert_eq!(created.file_urls.len(), 2);
        assert!(created.upload_date.is_some());

        let req = upload_request(&[
            Part::Json(r#"{"employee_id":"e1","document_type_id":"t1","private":true}"#),
            Part::File("visa.pdf", b"%PDF"),
        ]);
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let appended: EmployeeDocument = test::read_body_json(resp).await;
        assert_eq!(appended.id, created.id);
        assert_eq!(appended.file_names, ["front.png", "back.png", "visa.pdf"]);
        assert!(appended.file_urls[2].starts_with(PRIVATE_SCHEME));
        assert_eq!(appended.expiry_date, created.expiry_date);

        let all: Vec<EmployeeDocument> = store.list_as(kinds::EMPLOYEE_DOCUMENT, None).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[actix_web::test]
    async fn appends_to_the_document_shown_for_a_merged_type() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, store) = testing::context(dir.path());
        seed(store.as_ref());
        let employee_types = DocumentCatalog::Employee.entity_kind();
        let client_types = DocumentCatalog::Client.entity_kind();
        for (kind, record) in [
            (employee_types, json!({ "id": "t2", "name": "passport", "sort_order": 2 })),
            (employee_types, json!({ "id": "t3", "name": "Visa" })),
            (client_types, json!({ "id": "c1", "name": "VISA " })),
            (
                kinds::EMPLOYEE_DOCUMENT,
                json!({ "id": "old", "employee_id": "e1", "document_type_id": "t2",
                        "is_not_applicable": true }),
            ),
            (
                kinds::EMPLOYEE_DOCUMENT,
                json!({ "id": "stray", "employee_id": "e1", "document_type_id": "c1",
                        "file_urls": ["/files/public/v.png"], "file_names": ["v.png"] }),
            ),
        ] {
            store.create(kind, to_record(&record).unwrap()).unwrap();
        }
        store
            .update(employee_types, "t1", to_record(&json!({ "sort_order": 1 })).unwrap())
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        let req = upload_request(&[
            Part::Json(r#"{"employee_id":"e1","document_type_id":"t1"}"#),
            Part::File("p.png", b"passport"),
        ]);
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let passport: EmployeeDocument = test::read_body_json(resp).await;
        assert_eq!(passport.id, "old");
        assert_eq!(passport.file_names, ["p.png"]);
        assert!(!passport.is_not_applicable);

        let req = upload_request(&[
            Part::Json(r#"{"employee_id":"e1","document_type_id":"t3"}"#),
            Part::File("v2.png", b"visa"),
        ]);
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let visa: EmployeeDocument = test::read_body_json(resp).await;
        assert_eq!(visa.id, "stray");
        assert_eq!(visa.file_names, ["v.png", "v2.png"]);

        let all: Vec<EmployeeDocument> = store.list_as(kinds::EMPLOYEE_DOCUMENT, None).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[actix_web::test]
    async fn rejects_incomplete_or_unknown_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, store) = testing::context(dir.path());
        seed(store.as_ref());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(configure_routes()),
        )
        .await;

        let known = r#"{"employee_id":"e1","document_type_id":"t1"}"#;
        let unknown_type = r#"{"employee_id":"e1","document_type_id":"c9"}"#;
        let cases = vec![
            // No files.
            vec![Part::Json(known)],
            // Files before metadata.
            vec![Part::File("a.png", b"a"), Part::Json(known)],
            vec![Part::Json(unknown_type), Part::File("a.png", b"a")],
            vec![Part::Json(known), Part::File("run.exe", b"MZ")],
        ];
        for parts in cases {
            let resp = test::call_service(&app, upload_request(&parts).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let all: Vec<EmployeeDocument> = store.list_as(kinds::EMPLOYEE_DOCUMENT, None).unwrap();
        assert!(all.is_empty());
    }
}
