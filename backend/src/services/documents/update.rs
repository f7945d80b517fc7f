use crate::error::AppError;
use crate::services::AppContext;
use crate::store::{kinds, EntityStoreExt, Record};
use actix_web::{web, HttpResponse};
use common::model::document::EmployeeDocument;
use common::requests::{NotApplicableRequest, UpdateDocumentRequest};
use log::info;
use serde_json::{json, Value};

/// Edits `expiry_date` and `notes`. An explicit `null` clears the field.
pub(super) async fn update_metadata(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
    payload: web::Json<UpdateDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    let mut fields = Record::new();
    if let Some(expiry) = request.expiry_date {
        fields.insert("expiry_date".to_string(), json!(expiry));
    }
    if let Some(notes) = request.notes {
        let notes = notes.filter(|text| !text.trim().is_empty());
        fields.insert("notes".to_string(), json!(notes));
    }
    if fields.is_empty() {
        return Err(AppError::validation(
            "nothing to update: send expiry_date and/or notes",
        ));
    }
    fields.insert("last_updated_date".to_string(), json!(ctx.clock.now()));

    let document: EmployeeDocument =
        ctx.store
            .update_from(kinds::EMPLOYEE_DOCUMENT, &id, &fields)?;
    Ok(HttpResponse::Ok().json(document))
}

pub(super) async fn set_not_applicable(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
    payload: web::Json<NotApplicableRequest>,
) -> Result<HttpResponse, AppError> {
    let fields = json!({
        "is_not_applicable": Value::Bool(payload.is_not_applicable),
        "last_updated_date": ctx.clock.now(),
    });
    let document: EmployeeDocument =
        ctx.store
            .update_from(kinds::EMPLOYEE_DOCUMENT, &id, &fields)?;
    info!(
        "document {} marked {}",
        document.id,
        if document.is_not_applicable {
            "not applicable"
        } else {
            "applicable"
        }
    );
    Ok(HttpResponse::Ok().json(document))
}

pub(super) async fn remove(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.store.delete(kinds::EMPLOYEE_DOCUMENT, &id)?;
    info!("deleted document {}", id);
    Ok(HttpResponse::NoContent().finish())
}
