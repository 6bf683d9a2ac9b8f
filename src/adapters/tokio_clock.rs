//! Production clock backed by the tokio timer.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// [`Clock`] using `tokio::time`, so a paused test runtime controls it too.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
