use serde::{Deserialize, Serialize};

/// Status of a background job as reported by the `status/{job_id}` endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Progress in percent.
    InProgress(u32),
    /// Completed, with a short human readable summary.
    Completed(String),
    Failed(String),
}
