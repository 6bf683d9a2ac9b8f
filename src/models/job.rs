use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a background job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether the job can no longer change status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// One unit of asynchronous server work, as carried by `job_update` events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub job_id: String,
    pub scope: String,
    pub status: JobStatus,
    #[serde(default)]
    pub connector_id: Option<String>,
    #[serde(default)]
    pub connector_type: Option<String>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub max_attempts: u32,
    #[serde(default)]
    pub entities_updated: u64,
    #[serde(default)]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl Job {
    /// Whether the job is still pending or running.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether the backend will retry this job after a failure.
    pub fn can_retry(&self) -> bool {
        self.status == JobStatus::Failed && self.attempts < self.max_attempts
    }
}

/// Point-in-time aggregate of job activity, carried by `status_summary` events.
///
/// Each summary fully replaces the previous one; nothing is merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSummary {
    pub has_running: bool,
    pub running_count: u32,
    #[serde(default)]
    pub running_jobs: Vec<Job>,
    #[serde(default)]
    pub recent_completed: Vec<Job>,
    /// Jobs partitioned by connector family
    #[serde(default)]
    pub grouped: HashMap<String, Vec<Job>>,
    pub timestamp: DateTime<Utc>,
}

impl StatusSummary {
    /// Jobs of one connector family, empty when the family is absent.
    pub fn family(&self, family: &str) -> &[Job] {
        self.grouped.get(family).map(Vec::as_slice).unwrap_or(&[])
    }
}
