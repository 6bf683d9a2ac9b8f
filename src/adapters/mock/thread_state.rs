//! Scripted thread-state service.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::error::FetchError;
use crate::models::Message;
use crate::traits::{HttpError, ThreadStateClient};

type FetchResult = Result<Vec<Message>, FetchError>;

#[derive(Debug)]
enum Reply {
    Ready(FetchResult),
    Gated(oneshot::Receiver<FetchResult>),
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    default: Option<FetchResult>,
    calls: Vec<String>,
}

/// Thread-state client answering from a queue of scripted replies.
///
/// A gated reply blocks the fetch until the test sends its result, which
/// makes it possible to observe and cancel in-flight fetches.
#[derive(Debug, Clone, Default)]
pub struct MockThreadStateClient {
    script: Arc<Mutex<Script>>,
}

impl MockThreadStateClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_reply(&self, reply: FetchResult) {
        self.lock().replies.push_back(Reply::Ready(reply));
    }

    /// Queue a reply that is only delivered through the returned sender.
    pub fn push_gated(&self) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.lock().replies.push_back(Reply::Gated(rx));
        tx
    }

    /// Reply used once the queue is empty.
    pub fn set_default(&self, reply: FetchResult) {
        self.lock().default = Some(reply);
    }

    /// Thread ids fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl ThreadStateClient for MockThreadStateClient {
    async fn fetch_messages(&self, thread_id: &str) -> FetchResult {
        let reply = {
            let mut script = self.lock();
            script.calls.push(thread_id.to_string());
            match script.replies.pop_front() {
                Some(reply) => reply,
                None => Reply::Ready(script.default.clone().unwrap_or_else(|| {
                    Err(FetchError::Http(HttpError::Other(format!(
                        "No mock reply for thread {}",
                        thread_id
                    ))))
                })),
            }
        };

        match reply {
            Reply::Ready(result) => result,
            Reply::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Http(HttpError::Other("gate dropped".to_string())))),
        }
    }
}
