//! Message list synchronization.
//!
//! [`MessageSynchronizer`] keeps the message list of the selected thread in
//! step with the thread-state service: it refetches on selection changes and
//! on external signals, retries transient failures, and discards results of
//! fetches that were superseded.

mod retry;
mod synchronizer;

pub use retry::RetryPolicy;
pub use synchronizer::{FetchOutcome, MessageSynchronizer, SyncNotice};
