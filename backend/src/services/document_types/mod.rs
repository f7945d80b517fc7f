//! # Document Type Service
//!
//! CRUD over both document type catalogs under
//! `/api/document_types/{catalog}`, where `catalog` is `employee` or `client`.
//! Same verbs and status codes as the category service; `name` is required.
//! Duplicate names are accepted; the matrix merges them when it is built.

mod crud;

use crate::error::method_not_allowed;
use actix_web::web::{delete, get, post, put, resource, scope, to};
use actix_web::Scope;

const API_PATH: &str = "/api/document_types";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .service(
            resource("/{catalog}")
                .route(get().to(crud::list))
                .route(post().to(crud::create))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/{catalog}/{id}")
                .route(get().to(crud::get))
                .route(put().to(crud::update))
                .route(delete().to(crud::remove))
                .default_service(to(method_not_allowed)),
        )
}
