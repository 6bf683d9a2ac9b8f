//! Thread-state service abstraction.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::Message;

/// Source of the canonical, ordered message list of a thread.
#[async_trait]
pub trait ThreadStateClient: Send + Sync + 'static {
    async fn fetch_messages(&self, thread_id: &str) -> Result<Vec<Message>, FetchError>;
}
