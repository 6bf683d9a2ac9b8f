use std::time::{Duration, Instant};

use tracing::debug;

/// Stage of a resume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeStage {
    /// Submitting against the tried thread
    Attempt,
    /// The tried thread failed; a new thread is about to be created
    Fallback,
    Done,
}

impl ResumeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStage::Attempt => "attempt",
            ResumeStage::Fallback => "fallback",
            ResumeStage::Done => "done",
        }
    }
}

/// Identifies one attempt so late events of a superseded one are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeAttempt {
    pub id: AttemptId,
    pub case_id: String,
    /// Thread the first submission targets; `None` creates a new thread
    pub tried_thread_id: Option<String>,
    pub started_at: Instant,
    pub stage: ResumeStage,
}

/// Inputs to [`ResumeMachine::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeEvent {
    SubmissionSucceeded,
    SubmissionFailed {
        now: Instant,
        /// Thread selected at the time the error was observed
        selected_thread_id: Option<String>,
    },
    /// The pause before re-submitting has elapsed
    FallbackReady,
}

/// What the driver must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
    /// The attempt succeeded and is finished
    Complete,
    /// No fallback applies; hand the error back to the caller
    ReportError,
    /// Clear the selected thread, wait, then send [`ResumeEvent::FallbackReady`]
    BeginFallback,
    /// Submit again without a thread id; the attempt is finished
    Resubmit,
    /// The event belongs to an attempt that is no longer live
    Stale,
}

/// At most one live resume attempt and its transitions.
///
/// Pure: time is passed in, nothing is performed.
#[derive(Debug)]
pub struct ResumeMachine {
    window: Duration,
    current: Option<ResumeAttempt>,
    next_id: u64,
}

impl ResumeMachine {
    /// `window` bounds how long after the start an error still falls back.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            current: None,
            next_id: 0,
        }
    }

    /// Start a new attempt, discarding any live one.
    pub fn start(
        &mut self,
        case_id: impl Into<String>,
        tried_thread_id: Option<String>,
        now: Instant,
    ) -> AttemptId {
        self.next_id += 1;
        let id = AttemptId(self.next_id);
        if let Some(previous) = self.current.take() {
            debug!(
                "Resume attempt for case {} superseded in stage {}",
                previous.case_id,
                previous.stage.as_str()
            );
        }
        self.current = Some(ResumeAttempt {
            id,
            case_id: case_id.into(),
            tried_thread_id,
            started_at: now,
            stage: ResumeStage::Attempt,
        });
        id
    }

    pub fn current(&self) -> Option<&ResumeAttempt> {
        self.current.as_ref()
    }

    pub fn handle(&mut self, id: AttemptId, event: ResumeEvent) -> ResumeAction {
        let attempt = match self.current.as_mut() {
            Some(attempt) if attempt.id == id => attempt,
            _ => return ResumeAction::Stale,
        };

        match (attempt.stage, event) {
            (ResumeStage::Attempt, ResumeEvent::SubmissionSucceeded) => {
                self.current = None;
                ResumeAction::Complete
            }
            (
                ResumeStage::Attempt,
                ResumeEvent::SubmissionFailed {
                    now,
                    selected_thread_id,
                },
            ) => {
                let elapsed = now.saturating_duration_since(attempt.started_at);
                if elapsed < self.window && selected_thread_id == attempt.tried_thread_id {
                    attempt.stage = ResumeStage::Fallback;
                    ResumeAction::BeginFallback
                } else {
                    debug!(
                        "No fallback for case {} (elapsed {}ms, thread changed: {})",
                        attempt.case_id,
                        elapsed.as_millis(),
                        selected_thread_id != attempt.tried_thread_id
                    );
                    self.current = None;
                    ResumeAction::ReportError
                }
            }
            (ResumeStage::Fallback, ResumeEvent::FallbackReady) => {
                self.current = None;
                ResumeAction::Resubmit
            }
            _ => ResumeAction::Stale,
        }
    }
}
