//! # Category Service
//!
//! CRUD for administrator-defined categories under `/api/categories`.
//!
//! | Verb     | Path      | Result                                   |
//! |----------|-----------|------------------------------------------|
//! | `GET`    | `/`       | all categories ordered by `sort_order`   |
//! | `POST`   | `/`       | `201` with the created category          |
//! | `GET`    | `/{id}`   | one category or `404`                    |
//! | `PUT`    | `/{id}`   | partial update                           |
//! | `DELETE` | `/{id}`   | `204`                                    |
//!
//! Any other verb answers `405`. `name` is required on create and may not be
//! blanked on update.

mod crud;

use crate::error::method_not_allowed;
use actix_web::web::{delete, get, post, put, resource, scope, to};
use actix_web::Scope;

const API_PATH: &str = "/api/categories";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .service(
            resource("")
                .route(get().to(crud::list))
                .route(post().to(crud::create))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/{id}")
                .route(get().to(crud::get))
                .route(put().to(crud::update))
                .route(delete().to(crud::remove))
                .default_service(to(method_not_allowed)),
        )
}
