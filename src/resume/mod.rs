//! Resumption of an interrupted session turn.
//!
//! [`ResumeMachine`] is the pure state machine (attempt, fallback, done);
//! [`ResumeController`] drives it with real submissions and keeps the
//! selected thread in step. [`CaseRefreshTracker`] decides when the case
//! list should be refreshed after a submission.

mod controller;
mod machine;
mod refresh;

pub use controller::{ResumeController, ResumeOutcome, ResumeUpdate};
pub use machine::{AttemptId, ResumeAction, ResumeAttempt, ResumeEvent, ResumeMachine, ResumeStage};
pub use refresh::CaseRefreshTracker;
