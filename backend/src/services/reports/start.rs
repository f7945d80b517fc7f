//! `POST /api/reports/start`
//!
//! Schedules a compliance report and answers with its `job_id` at once. The
//! report is built on the blocking pool: load and reconcile everything, lay out
//! the content, render the PDF to `{report_dir}/{job_id}.pdf`. Progress flows from
//! the worker through a per-job channel into the shared [`JobsState`].

use super::{content, pdf};
use crate::error::AppError;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::loader::LoadedData;
use crate::services::matrix::build::build_view;
use crate::services::AppContext;
use crate::store::kinds;
use actix_web::{web, HttpResponse};
use common::jobs::JobStatus;
use common::requests::StartReportRequest;
use log::{error, info};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Progress reported by the blocking worker.
#[derive(Debug)]
enum ReportUpdate {
    Job(JobStatus),
    Step { done: usize, total: usize },
}

const STEPS: usize = 3;

pub(super) async fn process(
    ctx: web::Data<AppContext>,
    jobs: web::Data<JobsState>,
    payload: web::Json<StartReportRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    if let Some(employee_id) = &request.employee_id {
        ctx.store.get(kinds::EMPLOYEE, employee_id)?;
    }
    let job_id = schedule_report_job(ctx, jobs, request.employee_id).await;
    Ok(HttpResponse::Accepted().json(serde_json::json!({ "job_id": job_id })))
}

async fn schedule_report_job(
    ctx: web::Data<AppContext>,
    jobs: web::Data<JobsState>,
    employee_id: Option<String>,
) -> String {
    let job_id = Uuid::new_v4().to_string();
    jobs.jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);
    info!(
        "scheduled report {} for {}",
        job_id,
        employee_id.as_deref().unwrap_or("all employees")
    );

    let tx = jobs.tx.clone();
    let job_id_for_task = job_id.clone();
    tokio::spawn(async move {
        let job_id = job_id_for_task;
        let (report_tx, mut report_rx) = mpsc::channel::<ReportUpdate>(16);

        // Translates worker progress into job updates.
        let forward_tx = tx.clone();
        let forward_id = job_id.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(update) = report_rx.recv().await {
                let status = match update {
                    ReportUpdate::Job(status) => status,
                    ReportUpdate::Step { done, total } => {
                        JobStatus::InProgress((done * 100 / total.max(1)) as u32)
                    }
                };
                let _ = forward_tx
                    .send(JobUpdate {
                        job_id: forward_id.clone(),
                        status,
                    })
                    .await;
            }
        });

        let worker_id = job_id.clone();
        let handle = tokio::task::spawn_blocking(move || {
            build_report(&ctx, report_tx, &worker_id, employee_id.as_deref())
        });
        let result = handle.await;
        // The worker's sender is gone by now; let the forwarder drain so the
        // final status is not overwritten by a late progress update.
        let _ = forwarder.await;

        let status = match result {
            Ok(Ok(())) => {
                info!("report {} ready", job_id);
                JobStatus::Completed(format!("/api/reports/download/{}", job_id))
            }
            Ok(Err(e)) => {
                error!("report {} failed: {}", job_id, e);
                JobStatus::Failed(e.to_string())
            }
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = tx.send(JobUpdate { job_id, status }).await;
    });

    job_id
}

fn build_report(
    ctx: &AppContext,
    tx: mpsc::Sender<ReportUpdate>,
    job_id: &str,
    employee_id: Option<&str>,
) -> Result<(), pdf::ReportError> {
    let _ = tx.blocking_send(ReportUpdate::Job(JobStatus::InProgress(0)));

    let today = ctx.clock.now().date_naive();
    let view = build_view(
        LoadedData::load(ctx),
        today,
        ctx.config.expiry_warning_days,
    );
    let _ = tx.blocking_send(ReportUpdate::Step {
        done: 1,
        total: STEPS,
    });

    let blocks = content::report_blocks(&view, employee_id, today);
    let _ = tx.blocking_send(ReportUpdate::Step {
        done: 2,
        total: STEPS,
    });

    let output = ctx.config.report_dir.join(format!("{}.pdf", job_id));
    pdf::render(
        &blocks,
        &ctx.config.font_dir,
        ctx.config.report_logo.as_deref(),
        &output,
    )?;
    let _ = tx.blocking_send(ReportUpdate::Step {
        done: STEPS,
        total: STEPS,
    });
    Ok(())
}
