use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::machine::{AttemptId, ResumeAction, ResumeEvent, ResumeMachine, ResumeStage};
use super::refresh::CaseRefreshTracker;
use crate::config::SyncConfig;
use crate::models::ThreadSelection;
use crate::traits::{Clock, SubmissionOutcome, SubmissionRequest, Submitter};

/// Signals published by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeUpdate {
    StageChanged { case_id: String, stage: ResumeStage },
    /// The case list should be reloaded
    RefreshCases,
}

/// Final result of one resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The first submission succeeded
    Resumed { thread_id: Option<String> },
    /// The tried thread failed and a new thread was submitted to
    FellBack {
        thread_id: Option<String>,
        error: Option<String>,
    },
    /// The error is reported as-is; no fallback applied
    Failed { error: String },
    /// A newer resume took over before this one finished
    Superseded,
}

struct Inner<S, C> {
    submitter: S,
    clock: C,
    selection: ThreadSelection,
    fallback_delay: Duration,
    machine: Mutex<ResumeMachine>,
    refresh: Mutex<CaseRefreshTracker>,
    updates: broadcast::Sender<ResumeUpdate>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives resumption of a case's session.
///
/// The first submission targets the case's last known thread. If it fails
/// soon after starting, while that thread is still selected, the selection
/// is cleared and a new thread is created instead.
pub struct ResumeController<S: Submitter, C: Clock> {
    inner: Arc<Inner<S, C>>,
}

impl<S: Submitter, C: Clock> ResumeController<S, C> {
    pub fn new(submitter: S, clock: C, selection: ThreadSelection, config: &SyncConfig) -> Self {
        let (updates, _rx) = broadcast::channel(config.channel_capacity);
        Self {
            inner: Arc::new(Inner {
                submitter,
                clock,
                selection,
                fallback_delay: config.fallback_delay,
                machine: Mutex::new(ResumeMachine::new(config.resume_window)),
                refresh: Mutex::new(CaseRefreshTracker::new()),
                updates,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResumeUpdate> {
        self.inner.updates.subscribe()
    }

    /// Stage of the live attempt, if any.
    pub fn stage(&self) -> Option<ResumeStage> {
        lock(&self.inner.machine).current().map(|attempt| attempt.stage)
    }

    /// Resume an existing case on its last known thread.
    pub fn resume_case(
        &self,
        case_id: impl Into<String>,
        last_thread_id: Option<String>,
    ) -> JoinHandle<ResumeOutcome> {
        self.begin(case_id.into(), last_thread_id)
    }

    /// Open the first turn of a case that was just created.
    pub fn start_immediately(&self, case_id: impl Into<String>) -> JoinHandle<ResumeOutcome> {
        self.begin(case_id.into(), None)
    }

    /// Report submission activity from anywhere in the session; publishes
    /// [`ResumeUpdate::RefreshCases`] when the case list is due a reload.
    pub fn observe_submission(&self, is_loading: bool, case_status: Option<&str>) {
        self.inner.observe_submission(is_loading, case_status);
    }

    fn begin(&self, case_id: String, tried_thread_id: Option<String>) -> JoinHandle<ResumeOutcome> {
        let id = lock(&self.inner.machine).start(
            case_id.clone(),
            tried_thread_id.clone(),
            self.inner.clock.now(),
        );
        info!(
            "Resuming case {} on thread {}",
            case_id,
            tried_thread_id.as_deref().unwrap_or("<new>")
        );
        self.inner.selection.set(tried_thread_id.clone());
        self.inner.stage_changed(&case_id, ResumeStage::Attempt);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(id, case_id, tried_thread_id).await })
    }
}

impl<S: Submitter, C: Clock> Inner<S, C> {
    fn publish(&self, update: ResumeUpdate) {
        let _ = self.updates.send(update);
    }

    fn stage_changed(&self, case_id: &str, stage: ResumeStage) {
        self.publish(ResumeUpdate::StageChanged {
            case_id: case_id.to_string(),
            stage,
        });
    }

    fn observe_submission(&self, is_loading: bool, case_status: Option<&str>) {
        if lock(&self.refresh).observe(is_loading, case_status) {
            debug!("Case list refresh due");
            self.publish(ResumeUpdate::RefreshCases);
        }
    }

    fn handle(&self, id: AttemptId, event: ResumeEvent) -> ResumeAction {
        lock(&self.machine).handle(id, event)
    }

    async fn submit(&self, request: SubmissionRequest) -> SubmissionOutcome {
        self.observe_submission(true, None);
        let outcome = self.submitter.submit(request).await;
        self.observe_submission(false, outcome.case_status.as_deref());
        outcome
    }

    async fn run(
        &self,
        id: AttemptId,
        case_id: String,
        tried_thread_id: Option<String>,
    ) -> ResumeOutcome {
        let outcome = self
            .submit(SubmissionRequest::empty(case_id.clone(), tried_thread_id.clone()))
            .await;

        let error = match outcome.error {
            None => {
                return match self.handle(id, ResumeEvent::SubmissionSucceeded) {
                    ResumeAction::Complete => {
                        if outcome.thread_id.is_some() {
                            self.selection
                                .replace_if(tried_thread_id.as_deref(), outcome.thread_id.clone());
                        }
                        self.stage_changed(&case_id, ResumeStage::Done);
                        ResumeOutcome::Resumed {
                            thread_id: outcome.thread_id,
                        }
                    }
                    _ => ResumeOutcome::Superseded,
                };
            }
            Some(error) => error,
        };

        let event = ResumeEvent::SubmissionFailed {
            now: self.clock.now(),
            selected_thread_id: self.selection.current(),
        };
        match self.handle(id, event) {
            ResumeAction::BeginFallback => {}
            ResumeAction::ReportError => {
                warn!("Resume of case {} failed: {}", case_id, error);
                return ResumeOutcome::Failed { error };
            }
            _ => return ResumeOutcome::Superseded,
        }

        info!(
            "Resume of case {} failed ({}), falling back to a new thread",
            case_id, error
        );
        self.selection.replace_if(tried_thread_id.as_deref(), None);
        self.stage_changed(&case_id, ResumeStage::Fallback);
        self.clock.sleep(self.fallback_delay).await;

        if self.handle(id, ResumeEvent::FallbackReady) != ResumeAction::Resubmit {
            return ResumeOutcome::Superseded;
        }
        self.stage_changed(&case_id, ResumeStage::Done);

        let retry = self.submit(SubmissionRequest::empty(case_id.clone(), None)).await;
        if let Some(error) = &retry.error {
            warn!("Fallback submission for case {} failed: {}", case_id, error);
        } else if retry.thread_id.is_some() {
            self.selection.replace_if(None, retry.thread_id.clone());
        }
        ResumeOutcome::FellBack {
            thread_id: retry.thread_id,
            error: retry.error,
        }
    }
}
