//! `watch` command: follow the job stream until interrupted.

use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::adapters::{ReqwestHttpClient, TokioClock};
use crate::config::SyncConfig;
use crate::error::{StreamError, SyncResult};
use crate::jobs::{EventStreamClient, JobFilter, StreamUpdate};

/// Connect to the job stream and log every update until Ctrl-C, session
/// expiry, or reconnect exhaustion.
pub async fn run_watch(config: SyncConfig, filter: JobFilter) -> SyncResult<()> {
    let http = ReqwestHttpClient::new()?;
    let client = EventStreamClient::with_filter(http, TokioClock, &config, filter);
    let mut updates = client.subscribe();
    client.connect();
    info!("Watching {}", config.base_url);

    loop {
        let update = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                client.disconnect();
                return Ok(());
            }
            update = updates.recv() => update,
        };

        match update {
            Ok(StreamUpdate::JobUpdate(job)) => {
                info!(
                    "job {} [{}] {} ({} entities)",
                    job.job_id,
                    job.scope,
                    job.status.as_str(),
                    job.entities_updated
                );
                if job.can_retry() {
                    warn!(
                        "job {} failed on attempt {} of {}, backend will retry",
                        job.job_id, job.attempts, job.max_attempts
                    );
                }
                let active = client.jobs().iter().filter(|j| j.is_active()).count();
                info!("{} active job(s) tracked", active);
            }
            Ok(StreamUpdate::StatusSummary(summary)) => {
                info!("{} job(s) running", summary.running_count)
            }
            Ok(StreamUpdate::ConnectionChanged(state)) => info!("connection {}", state),
            Ok(StreamUpdate::Error(err)) if err.is_terminal() => {
                error!("[{}] {}", err.error_code(), err.user_message());
                return Err(err.into());
            }
            Ok(StreamUpdate::Error(err)) => warn!("[{}] {}", err.error_code(), err.user_message()),
            Ok(StreamUpdate::SessionExpired) => return Err(StreamError::Unauthorized.into()),
            Err(RecvError::Lagged(skipped)) => warn!("Skipped {} updates", skipped),
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
