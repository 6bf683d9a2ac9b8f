//! Submission abstraction.
//!
//! The streaming-session provider that opens a new remote turn lives
//! outside this crate; the resume controller only issues requests and
//! inspects the outcome.

use async_trait::async_trait;

/// A turn to open against a case, optionally on an existing thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub case_id: String,
    /// `None` asks the provider to create a new thread
    pub thread_id: Option<String>,
    pub content: String,
    /// Whether the reply stream can be re-joined after a disconnect
    pub resumable: bool,
}

impl SubmissionRequest {
    /// Empty-content, resumable turn used to (re)attach to a thread.
    pub fn empty(case_id: impl Into<String>, thread_id: Option<String>) -> Self {
        Self {
            case_id: case_id.into(),
            thread_id,
            content: String::new(),
            resumable: true,
        }
    }
}

/// What the provider reported once the submission stopped loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Thread the turn ran on (newly created or reused)
    pub thread_id: Option<String>,
    /// Set when the submission failed
    pub error: Option<String>,
    /// Case status as reported by the provider after the turn
    pub case_status: Option<String>,
}

impl SubmissionOutcome {
    pub fn success(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn with_case_status(mut self, status: impl Into<String>) -> Self {
        self.case_status = Some(status.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[async_trait]
pub trait Submitter: Send + Sync + 'static {
    async fn submit(&self, request: SubmissionRequest) -> SubmissionOutcome;
}
