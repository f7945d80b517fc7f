use crate::error::AppError;
use crate::job_controller::state::JobsState;
use crate::services::AppContext;
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web;
use common::jobs::JobStatus;
use uuid::Uuid;

pub(super) async fn process(
    ctx: web::Data<AppContext>,
    jobs: web::Data<JobsState>,
    job_id: web::Path<String>,
) -> Result<NamedFile, AppError> {
    let not_found = || AppError::NotFound(format!("report {}", job_id));

    // Job ids double as file names, so nothing else may reach the filesystem.
    let job_id = Uuid::parse_str(&job_id).map_err(|_| not_found())?;
    if !matches!(
        jobs.status(&job_id.to_string()).await,
        Some(JobStatus::Completed(_))
    ) {
        return Err(not_found());
    }

    let path = ctx.config.report_dir.join(format!("{}.pdf", job_id));
    let file = NamedFile::open_async(&path).await.map_err(|_| not_found())?;
    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(format!(
            "compliance-report-{}.pdf",
            job_id
        ))],
    }))
}
