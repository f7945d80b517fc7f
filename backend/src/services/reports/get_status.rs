use crate::error::AppError;
use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse};

pub(super) async fn process(
    job_id: web::Path<String>,
    jobs: web::Data<JobsState>,
) -> Result<HttpResponse, AppError> {
    match jobs.status(&job_id).await {
        Some(status) => Ok(HttpResponse::Ok().json(status)),
        None => Err(AppError::NotFound(format!("job {}", job_id))),
    }
}
