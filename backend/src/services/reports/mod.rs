//! # Compliance Report Service
//!
//! PDF reports are rendered in the background:
//!
//! - `POST /api/reports/start` with `{ "employee_id": ... }` (optional) schedules a
//!   job and returns `{ "job_id": ... }` right away.
//! - `GET /api/reports/status/{job_id}` reports `Pending`, `InProgress(percent)`,
//!   `Completed(download url)` or `Failed(reason)`.
//! - `GET /api/reports/download/{job_id}` serves the finished PDF.
//!
//! Job bookkeeping lives in [`crate::job_controller`].

mod content;
mod download;
mod get_status;
mod pdf;
mod start;

use crate::error::method_not_allowed;
use actix_web::web::{get, post, resource, scope, to};
use actix_web::Scope;

const API_PATH: &str = "/api/reports";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .service(
            resource("/start")
                .route(post().to(start::process))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/status/{job_id}")
                .route(get().to(get_status::process))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/download/{job_id}")
                .route(get().to(download::process))
                .default_service(to(method_not_allowed)),
        )
}
