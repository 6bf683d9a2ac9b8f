//! Clock abstraction.
//!
//! Every timing decision (backoff delays, retry delays, the resume window)
//! goes through [`Clock`] so tests can run on virtual time.

use async_trait::async_trait;
use std::time::{Duration, Instant};

#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}
