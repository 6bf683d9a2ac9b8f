use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::retry::RetryPolicy;
use crate::config::SyncConfig;
use crate::error::FetchError;
use crate::models::Message;
use crate::traits::{Clock, ThreadStateClient};

/// User-visible signals from the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotice {
    MessagesUpdated { thread_id: String, count: usize },
    /// All tries failed; the previous messages are still shown
    FetchFailed { thread_id: String, message: String },
    SessionExpired,
}

/// How a fetch ended, as seen by whoever awaits its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { count: usize },
    /// Superseded or aborted; nothing was applied
    Cancelled,
    Failed(FetchError),
    SessionExpired,
}

struct SyncState {
    thread_id: Option<String>,
    messages: Vec<Message>,
    is_loading: bool,
    generation: u64,
    cancel: Option<CancellationToken>,
}

struct Inner<T, C> {
    client: T,
    clock: C,
    policy: RetryPolicy,
    refetch_delay: Duration,
    notices: broadcast::Sender<SyncNotice>,
    state: Mutex<SyncState>,
}

/// Keeps the message list of the selected thread current.
///
/// At most one fetch can ever apply its result: starting a fetch cancels the
/// previous one and bumps a generation counter that late results are
/// checked against. Clones share state.
pub struct MessageSynchronizer<T: ThreadStateClient, C: Clock> {
    inner: Arc<Inner<T, C>>,
}

impl<T: ThreadStateClient, C: Clock> Clone for MessageSynchronizer<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ThreadStateClient, C: Clock> MessageSynchronizer<T, C> {
    pub fn new(client: T, clock: C, config: &SyncConfig) -> Self {
        let (notices, _rx) = broadcast::channel(config.channel_capacity);
        Self {
            inner: Arc::new(Inner {
                client,
                clock,
                policy: config.fetch_retry,
                refetch_delay: config.refetch_delay,
                notices,
                state: Mutex::new(SyncState {
                    thread_id: None,
                    messages: Vec::new(),
                    is_loading: false,
                    generation: 0,
                    cancel: None,
                }),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotice> {
        self.inner.notices.subscribe()
    }

    /// Messages of the selected thread, in server order.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.lock().messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().is_loading
    }

    pub fn thread_id(&self) -> Option<String> {
        self.inner.lock().thread_id.clone()
    }

    /// Switch to `thread_id` and fetch its messages without delay.
    ///
    /// Selecting `None` cancels any fetch and clears the list; no handle is
    /// returned then.
    pub fn select_thread(&self, thread_id: Option<String>) -> Option<JoinHandle<FetchOutcome>> {
        match thread_id {
            Some(thread_id) => Some(self.fetch_messages(thread_id)),
            None => {
                let mut state = self.inner.lock();
                state.invalidate();
                state.thread_id = None;
                state.messages.clear();
                state.is_loading = false;
                debug!("Thread deselected, messages cleared");
                None
            }
        }
    }

    /// Fetch the selected thread again after the configured delay.
    ///
    /// Used when something outside signals that the list changed. Returns
    /// `None` when no thread is selected.
    pub fn refetch(&self) -> Option<JoinHandle<FetchOutcome>> {
        let thread_id = self.thread_id()?;
        Some(self.start_fetch(thread_id, self.inner.refetch_delay))
    }

    /// Fetch `thread_id` immediately, making it the selected thread.
    pub fn fetch_messages(&self, thread_id: impl Into<String>) -> JoinHandle<FetchOutcome> {
        self.start_fetch(thread_id.into(), Duration::ZERO)
    }

    /// Re-select whenever `selection` changes, starting with its current value.
    ///
    /// The task ends when every sender of the selection is gone.
    pub fn follow(&self, mut selection: watch::Receiver<Option<String>>) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                let thread_id = selection.borrow_and_update().clone();
                // A coalesced clear-then-reselect of the current thread does not refetch.
                if thread_id != this.thread_id() || thread_id.is_none() {
                    this.select_thread(thread_id);
                }
                if selection.changed().await.is_err() {
                    return;
                }
            }
        })
    }

    fn start_fetch(&self, thread_id: String, delay: Duration) -> JoinHandle<FetchOutcome> {
        let (generation, token) = {
            let mut state = self.inner.lock();
            state.invalidate();
            // Shown messages stay until a result for this thread replaces them.
            state.thread_id = Some(thread_id.clone());
            state.generation += 1;
            state.is_loading = true;
            let token = CancellationToken::new();
            state.cancel = Some(token.clone());
            (state.generation, token)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_fetch(generation, token, thread_id, delay).await })
    }
}

impl SyncState {
    /// Cancel the in-flight fetch, if any, and make its result stale.
    fn invalidate(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.generation += 1;
    }
}

impl<T: ThreadStateClient, C: Clock> Inner<T, C> {
    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, notice: SyncNotice) {
        let _ = self.notices.send(notice);
    }

    async fn run_fetch(
        &self,
        generation: u64,
        token: CancellationToken,
        thread_id: String,
        delay: Duration,
    ) -> FetchOutcome {
        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!("Fetch for thread {} cancelled", thread_id);
                return FetchOutcome::Cancelled;
            }
            result = self.fetch_with_retry(&thread_id, delay) => result,
        };

        let mut state = self.lock();
        if state.generation != generation || token.is_cancelled() {
            debug!("Discarding stale fetch result for thread {}", thread_id);
            return FetchOutcome::Cancelled;
        }
        state.cancel = None;
        state.is_loading = false;

        match result {
            Ok(messages) => {
                let count = messages.len();
                state.messages = messages;
                debug!("Applied {} messages for thread {}", count, thread_id);
                self.notify(SyncNotice::MessagesUpdated { thread_id, count });
                FetchOutcome::Applied { count }
            }
            Err(FetchError::Unauthorized) => {
                warn!("Message fetch rejected with 401, session expired");
                self.notify(SyncNotice::SessionExpired);
                FetchOutcome::SessionExpired
            }
            Err(FetchError::Cancelled) => FetchOutcome::Cancelled,
            Err(err) => {
                warn!(
                    "Giving up on messages for thread {} after {} tries: {}",
                    thread_id, self.policy.max_attempts, err
                );
                self.notify(SyncNotice::FetchFailed {
                    thread_id,
                    message: err.to_string(),
                });
                FetchOutcome::Failed(err)
            }
        }
    }

    async fn fetch_with_retry(
        &self,
        thread_id: &str,
        delay: Duration,
    ) -> Result<Vec<Message>, FetchError> {
        if !delay.is_zero() {
            self.clock.sleep(delay).await;
        }

        let mut attempt = 1;
        loop {
            match self.client.fetch_messages(thread_id).await {
                Ok(messages) => {
                    if attempt > 1 {
                        info!("Message fetch for thread {} succeeded on try {}", thread_id, attempt);
                    }
                    return Ok(messages);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => match self.policy.delay_after(attempt) {
                    Some(wait) => {
                        debug!(
                            "Message fetch try {} failed ({}), retrying in {}ms",
                            attempt,
                            err,
                            wait.as_millis()
                        );
                        self.clock.sleep(wait).await;
                        attempt += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}
