//! # Employee Service
//!
//! | Method | Path                      | Notes                                  |
//! |--------|---------------------------|----------------------------------------|
//! | GET    | `/api/employees`          | ordered by full name                   |
//! | POST   | `/api/employees`          | `full_name` and a valid `email` needed |
//! | GET    | `/api/employees/org_chart`| manager tree of active employees       |
//! | GET    | `/api/employees/{id}`     |                                        |
//! | PUT    | `/api/employees/{id}`     | partial update                         |
//! | DELETE | `/api/employees/{id}`     |                                        |

mod crud;
mod org_chart;

use crate::error::method_not_allowed;
use actix_web::web::{delete, get, post, put, resource, scope, to};
use actix_web::Scope;

const API_PATH: &str = "/api/employees";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .service(
            resource("")
                .route(get().to(crud::list))
                .route(post().to(crud::create))
                .default_service(to(method_not_allowed)),
        )
        // Registered before `/{id}` so it is not taken for an employee id.
        .service(
            resource("/org_chart")
                .route(get().to(org_chart::get_org_chart))
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
