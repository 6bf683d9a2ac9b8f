//! Scripted submission provider.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::traits::{SubmissionOutcome, SubmissionRequest, Submitter};

#[derive(Debug)]
enum Reply {
    Ready(SubmissionOutcome),
    Gated(oneshot::Receiver<SubmissionOutcome>),
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    requests: Vec<SubmissionRequest>,
}

/// Submitter answering from a queue of scripted outcomes.
///
/// With nothing queued a submission fails with "no scripted outcome".
#[derive(Debug, Clone, Default)]
pub struct MockSubmitter {
    script: Arc<Mutex<Script>>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_outcome(&self, outcome: SubmissionOutcome) {
        self.lock().replies.push_back(Reply::Ready(outcome));
    }

    /// Queue an outcome that is only delivered through the returned sender.
    pub fn push_gated(&self) -> oneshot::Sender<SubmissionOutcome> {
        let (tx, rx) = oneshot::channel();
        self.lock().replies.push_back(Reply::Gated(rx));
        tx
    }

    /// Requests submitted so far, in order.
    pub fn requests(&self) -> Vec<SubmissionRequest> {
        self.lock().requests.clone()
    }
}

#[async_trait]
impl Submitter for MockSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> SubmissionOutcome {
        let reply = {
            let mut script = self.lock();
            script.requests.push(request);
            script.replies.pop_front()
        };

        match reply {
            Some(Reply::Ready(outcome)) => outcome,
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| SubmissionOutcome::failure("gate dropped")),
            None => SubmissionOutcome::failure("no scripted outcome"),
        }
    }
}
