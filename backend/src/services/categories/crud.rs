use crate::error::AppError;
use crate::services::validate::{optional_text, required_text};
use crate::services::AppContext;
use crate::store::{kinds, EntityStoreExt};
use actix_web::{web, HttpResponse};
use common::model::category::Category;
use common::requests::CategoryInput;
use log::info;

pub(super) async fn list(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let categories: Vec<Category> = ctx.store.list_as(kinds::CATEGORY, Some("sort_order"))?;
    Ok(HttpResponse::Ok().json(categories))
}

pub(super) async fn get(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let category: Category = ctx.store.get_as(kinds::CATEGORY, &id)?;
    Ok(HttpResponse::Ok().json(category))
}

pub(super) async fn create(
    ctx: web::Data<AppContext>,
    payload: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = payload.into_inner();
    input.name = Some(required_text(input.name.as_deref(), "name")?);

    let category: Category = ctx.store.create_from(kinds::CATEGORY, &input)?;
    info!("created category {} ({})", category.id, category.name);
    Ok(HttpResponse::Created().json(category))
}

pub(super) async fn update(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
    payload: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = payload.into_inner();
    input.name = optional_text(input.name.as_deref(), "name")?;

    let category: Category = ctx.store.update_from(kinds::CATEGORY, &id, &input)?;
    Ok(HttpResponse::Ok().json(category))
}

pub(super) async fn remove(
    ctx: web::Data<AppContext>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.store.delete(kinds::CATEGORY, &id)?;
    info!("deleted category {}", id);
    Ok(HttpResponse::NoContent().finish())
}
