//! `messages` command: fetch one thread's messages.

use crate::adapters::{HttpThreadStateClient, ReqwestHttpClient, TokioClock};
use crate::config::SyncConfig;
use crate::error::{FetchError, SyncResult};
use crate::messages::{FetchOutcome, MessageSynchronizer};

/// Fetch `thread_id` with the usual retry policy and print each message's
/// role and id.
pub async fn run_messages(config: SyncConfig, thread_id: String) -> SyncResult<()> {
    let http = ReqwestHttpClient::new()?;
    let client = HttpThreadStateClient::new(http, config.base_url.clone())
        .with_session_cookie(config.session_cookie.clone());
    let sync = MessageSynchronizer::new(client, TokioClock, &config);

    let outcome = sync
        .fetch_messages(thread_id.clone())
        .await
        .unwrap_or(FetchOutcome::Cancelled);

    match outcome {
        FetchOutcome::Applied { count } => {
            println!("{} message(s) in thread {}", count, thread_id);
            for message in sync.messages() {
                println!(
                    "  {:<10} {}",
                    message.role().unwrap_or("?"),
                    message.id().unwrap_or("-")
                );
            }
            Ok(())
        }
        FetchOutcome::Failed(err) => Err(err.into()),
        FetchOutcome::SessionExpired => Err(FetchError::Unauthorized.into()),
        FetchOutcome::Cancelled => Err(FetchError::Cancelled.into()),
    }
}
