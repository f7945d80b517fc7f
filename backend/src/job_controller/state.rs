//! Manages the state of long-running, asynchronous background jobs.
//!
//! Report generation runs outside the request/response cycle (see
//! `services/reports/start.rs`). The pieces:
//! - `JobsState`: a clonable, thread-safe handle on the status of every job,
//!   injected into the Actix application state in `main.rs`.
//! - `JobUpdate`: a status change sent by a background job.
//! - `start_job_updater`: a long-running task that drains `JobUpdate`s from an
//!   MPSC channel into the shared map.

use common::jobs::JobStatus;
use log::debug;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// A thread-safe, shareable container for the state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status. Read by the `status/{job_id}` endpoints, written
    /// only by `start_job_updater`.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Background tasks push their `JobUpdate`s here instead of locking `jobs`.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Creates the shared state and the receiver to hand to `start_job_updater`.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// A status update for a specific background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies `JobUpdate`s to the shared map until every sender is gone.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        debug!("job {} -> {:?}", update.job_id, update.status);
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn updates_are_applied_in_order() {
        let (state, rx) = JobsState::new(8);
        let JobsState { jobs, tx } = state;

        for status in [
            JobStatus::Pending,
            JobStatus::InProgress(50),
            JobStatus::Completed("done".into()),
        ] {
            tx.send(JobUpdate {
                job_id: "job-1".to_string(),
                status,
            })
            .await
            .unwrap();
        }
        drop(tx);

        // The updater's own sender must belong to another channel, or it never stops.
        let (detached_tx, _detached_rx) = mpsc::channel(1);
        start_job_updater(
            JobsState {
                jobs: jobs.clone(),
                tx: detached_tx,
            },
            rx,
        )
        .await;

        assert_eq!(
            jobs.read().await.get("job-1"),
            Some(&JobStatus::Completed("done".into()))
        );
    }
}
