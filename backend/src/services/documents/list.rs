use crate::error::AppError;
use crate::services::AppContext;
use crate::store::{criteria, kinds, EntityStoreExt};
use actix_web::{web, HttpResponse};
use common::model::document::EmployeeDocument;
use common::requests::DocumentListQuery;
use serde_json::Value;

pub(super) async fn process(
    ctx: web::Data<AppContext>,
    query: web::Query<DocumentListQuery>,
) -> Result<HttpResponse, AppError> {
    let documents: Vec<EmployeeDocument> = match &query.employee_id {
        Some(employee_id) => ctx.store.filter_as(
            kinds::EMPLOYEE_DOCUMENT,
            &criteria([("employee_id", Value::String(employee_id.clone()))]),
        )?,
        None => ctx.store.list_as(kinds::EMPLOYEE_DOCUMENT, None)?,
    };
    Ok(HttpResponse::Ok().json(documents))
}
