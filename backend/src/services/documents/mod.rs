//! # Employee Document Service
//!
//! | Method | Path                                  | Notes                                   |
//! |--------|---------------------------------------|-----------------------------------------|
//! | GET    | `/api/documents?employee_id=`         | all documents, or one employee's        |
//! | POST   | `/api/documents/upload`               | multipart: `json` part, then `file`s    |
//! | POST   | `/api/documents/repair?force=`        | rewrite rescued orphan type ids         |
//! | PUT    | `/api/documents/{id}`                 | `expiry_date` / `notes`                 |
//! | POST   | `/api/documents/{id}/not_applicable`  | `{ "is_not_applicable": bool }`         |
//! | DELETE | `/api/documents/{id}`                 |                                         |
//!
//! Uploading to an (employee, type) pair that already has a document appends the
//! files to it instead of creating a second record.

mod list;
mod repair;
mod update;
mod upload;

use crate::error::method_not_allowed;
use actix_web::web::{delete, get, post, put, resource, scope, to};
use actix_web::Scope;

const API_PATH: &str = "/api/documents";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .service(
            resource("")
                .route(get().to(list::process))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/upload")
                .route(post().to(upload::process))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/repair")
                .route(post().to(repair::process))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/{id}/not_applicable")
                .route(post().to(update::set_not_applicable))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/{id}")
                .route(put().to(update::update_metadata))
                .route(delete().to(update::remove))
                .default_service(to(method_not_allowed)),
        )
}
