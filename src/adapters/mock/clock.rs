//! Virtual clock for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::traits::Clock;

#[derive(Debug)]
struct ClockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// Clock whose time only moves when told to.
///
/// Every `sleep` is recorded and advances virtual time by its duration, then
/// yields once to the scheduler. With [`with_parked_sleeps`](Self::with_parked_sleeps)
/// sleeps are still recorded but never finish, which leaves the caller
/// waiting on whatever it races the sleep against.
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    state: Arc<Mutex<ClockState>>,
    parked: bool,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Arc::new(Mutex::new(ClockState {
                elapsed: Duration::ZERO,
                sleeps: Vec::new(),
            })),
            parked: false,
        }
    }

    pub fn with_parked_sleeps(mut self) -> Self {
        self.parked = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move virtual time forward without sleeping.
    pub fn advance(&self, duration: Duration) {
        self.lock().elapsed += duration;
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }
}

#[async_trait]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.lock().elapsed
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut state = self.lock();
            state.sleeps.push(duration);
            if !self.parked {
                state.elapsed += duration;
            }
        }
        if self.parked {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
    }
}
