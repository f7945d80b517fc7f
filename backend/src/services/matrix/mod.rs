//! # Document Matrix Service
//!
//! - `GET /api/matrix`: the reconciled matrix as JSON ([`MatrixView`]).
//! - `GET /api/matrix/export.csv`: the same matrix as a CSV attachment.
//!
//! Both degrade instead of failing when a collection cannot be loaded; the
//! reasons end up in `warnings`.
//!
//! [`MatrixView`]: common::model::matrix::MatrixView

pub(crate) mod build;
pub(crate) mod export;

use crate::error::method_not_allowed;
use actix_web::web::{get, resource, scope, to};
use actix_web::Scope;

const API_PATH: &str = "/api/matrix";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .service(
            resource("")
                .route(get().to(build::process))
                .default_service(to(method_not_allowed)),
        )
        .service(
            resource("/export.csv")
                .route(get().to(export::process))
                .default_service(to(method_not_allowed)),
        )
}
