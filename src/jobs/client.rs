//! Streaming client for the job event endpoint.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::backoff::Backoff;
use super::filter::JobFilter;
use super::store::{JobChange, JobStore};
use crate::config::SyncConfig;
use crate::domain::ConnectionState;
use crate::error::StreamError;
use crate::models::{Job, StatusSummary};
use crate::sse::{parse_job_event, JobEvent, RawSseEvent, SseDecoder};
use crate::traits::{Clock, Headers, HttpClient, HttpError};

/// Everything the client reports, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// A job was inserted or replaced in the job list
    JobUpdate(Job),
    /// A new summary replaced the previous one
    StatusSummary(StatusSummary),
    /// In-stream server error, or the terminal reconnect-exhausted error
    Error(StreamError),
    ConnectionChanged(ConnectionState),
    /// The server answered 401; the client will not reconnect
    SessionExpired,
}

/// How one connection ended.
enum StreamEnd {
    /// Deliberately aborted; nothing to do
    Cancelled,
    Unauthorized,
    Failed(StreamError),
}

struct ClientState {
    connection: ConnectionState,
    filter: JobFilter,
    /// Bumped for every new connection; stale tasks compare against it
    generation: u64,
    cancel: Option<CancellationToken>,
    backoff: Backoff,
    manual_disconnect: bool,
    jobs: JobStore,
    summary: Option<StatusSummary>,
    last_error: Option<StreamError>,
}

struct Inner<H, C> {
    http: H,
    clock: C,
    base_url: String,
    session_cookie: Option<String>,
    updates: broadcast::Sender<StreamUpdate>,
    state: Mutex<ClientState>,
}

/// Client for the job event stream.
///
/// Owns at most one live connection. Failed connections are retried with
/// exponential backoff; a 401 or too many consecutive failures stop the
/// client until [`reconnect`](Self::reconnect) is called.
///
/// # Example
///
/// ```ignore
/// let client = EventStreamClient::new(ReqwestHttpClient::new(), TokioClock, &config);
/// let mut updates = client.subscribe();
/// client.connect();
/// while let Ok(update) = updates.recv().await {
///     // render
/// }
/// ```
pub struct EventStreamClient<H: HttpClient, C: Clock> {
    inner: Arc<Inner<H, C>>,
}

impl<H: HttpClient, C: Clock> EventStreamClient<H, C> {
    pub fn new(http: H, clock: C, config: &SyncConfig) -> Self {
        Self::with_filter(http, clock, config, JobFilter::default())
    }

    pub fn with_filter(http: H, clock: C, config: &SyncConfig, filter: JobFilter) -> Self {
        let (updates, _rx) = broadcast::channel(config.channel_capacity);
        Self {
            inner: Arc::new(Inner {
                http,
                clock,
                base_url: config.base_url.clone(),
                session_cookie: config.session_cookie.clone(),
                updates,
                state: Mutex::new(ClientState {
                    connection: ConnectionState::Disconnected,
                    filter,
                    generation: 0,
                    cancel: None,
                    backoff: Backoff::new(config.reconnect),
                    manual_disconnect: false,
                    jobs: JobStore::new(),
                    summary: None,
                    last_error: None,
                }),
            }),
        }
    }

    /// Receive every update published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamUpdate> {
        self.inner.updates.subscribe()
    }

    /// Open a connection, replacing any current one.
    pub fn connect(&self) {
        self.inner.lock().manual_disconnect = false;
        self.start_connection();
    }

    /// Connect again immediately with a clean attempt counter and no stored error.
    pub fn reconnect(&self) {
        {
            let mut state = self.inner.lock();
            state.manual_disconnect = false;
            state.backoff.reset();
            state.last_error = None;
        }
        info!("Manual reconnect requested");
        self.start_connection();
    }

    /// Stop the connection and any pending reconnect. Idempotent.
    pub fn disconnect(&self) {
        let mut state = self.inner.lock();
        state.manual_disconnect = true;
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        state.generation += 1;
        if state.connection != ConnectionState::Disconnected {
            info!("Job stream disconnected");
        }
        self.inner
            .set_connection(&mut state, ConnectionState::Disconnected);
    }

    /// Change the server-side filter. A live connection is re-opened with it.
    pub fn set_filter(&self, filter: JobFilter) {
        let restart = {
            let mut state = self.inner.lock();
            if state.filter == filter {
                return;
            }
            state.filter = filter;
            !state.manual_disconnect && state.cancel.is_some()
        };
        if restart {
            debug!("Job filter changed, reconnecting");
            self.start_connection();
        }
    }

    pub fn filter(&self) -> JobFilter {
        self.inner.lock().filter.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.lock().connection
    }

    /// Job list, most recent first.
    pub fn jobs(&self) -> Vec<Job> {
        self.inner.lock().jobs.jobs().to_vec()
    }

    pub fn summary(&self) -> Option<StatusSummary> {
        self.inner.lock().summary.clone()
    }

    pub fn last_error(&self) -> Option<StreamError> {
        self.inner.lock().last_error.clone()
    }

    /// Consecutive failed connection attempts since the last success.
    pub fn attempts(&self) -> u32 {
        self.inner.lock().backoff.attempts()
    }

    fn start_connection(&self) {
        let (generation, token) = {
            let mut state = self.inner.lock();
            if let Some(previous) = state.cancel.take() {
                previous.cancel();
            }
            state.generation += 1;
            let token = CancellationToken::new();
            state.cancel = Some(token.clone());
            (state.generation, token)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(generation, token).await });
    }
}

impl<H: HttpClient, C: Clock> Drop for EventStreamClient<H, C> {
    fn drop(&mut self) {
        if let Some(token) = self.inner.lock().cancel.take() {
            token.cancel();
        }
    }
}

impl<H: HttpClient, C: Clock> Inner<H, C> {
    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, update: StreamUpdate) {
        // No subscribers is fine
        let _ = self.updates.send(update);
    }

    fn set_connection(&self, state: &mut ClientState, connection: ConnectionState) {
        if state.connection != connection {
            debug!("Job stream state {} -> {}", state.connection, connection);
            state.connection = connection;
            self.publish(StreamUpdate::ConnectionChanged(connection));
        }
    }

    /// Run `f` only if `generation` still owns the client.
    fn with_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut ClientState) -> R,
    ) -> Option<R> {
        let mut state = self.lock();
        if state.generation != generation {
            return None;
        }
        Some(f(&mut state))
    }

    fn request_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert("Cache-Control".to_string(), "no-cache".to_string());
        if let Some(cookie) = &self.session_cookie {
            headers.insert("Cookie".to_string(), cookie.clone());
        }
        headers
    }

    async fn run(self: Arc<Self>, generation: u64, token: CancellationToken) {
        loop {
            let filter = match self.with_current(generation, |state| {
                self.set_connection(state, ConnectionState::Connecting);
                state.filter.clone()
            }) {
                Some(filter) => filter,
                None => return,
            };

            let url = match filter.stream_url(&self.base_url) {
                Ok(url) => url,
                Err(e) => {
                    error!("Cannot build job stream URL: {}", e);
                    self.with_current(generation, |state| {
                        let err = StreamError::ConnectionFailed {
                            message: e.to_string(),
                        };
                        state.last_error = Some(err.clone());
                        self.set_connection(state, ConnectionState::Error);
                        self.publish(StreamUpdate::Error(err));
                    });
                    return;
                }
            };

            let end = tokio::select! {
                _ = token.cancelled() => StreamEnd::Cancelled,
                end = self.stream_once(generation, url.as_str()) => end,
            };

            let err = match end {
                StreamEnd::Cancelled => {
                    debug!("Job stream connection cancelled");
                    return;
                }
                StreamEnd::Unauthorized => {
                    self.expire_session(generation);
                    return;
                }
                StreamEnd::Failed(err) => err,
            };

            if token.is_cancelled() {
                return;
            }

            let delay = match self.with_current(generation, |state| self.schedule_retry(state, &err)) {
                Some(Some(delay)) => delay,
                _ => return,
            };

            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Pending reconnect cancelled");
                    return;
                }
                _ = self.clock.sleep(delay) => {}
            }
        }
    }

    /// Decide what follows a failed connection. Returns the backoff delay,
    /// or `None` when the client stops.
    fn schedule_retry(
        &self,
        state: &mut ClientState,
        err: &StreamError,
    ) -> Option<std::time::Duration> {
        if state.manual_disconnect {
            return None;
        }
        match state.backoff.next_delay() {
            Some(delay) => {
                warn!(
                    "Job stream failed ({}), reconnect {} of {} in {}ms",
                    err,
                    state.backoff.attempts(),
                    state.backoff.policy().max_attempts,
                    delay.as_millis()
                );
                self.set_connection(state, ConnectionState::Disconnected);
                Some(delay)
            }
            None => {
                let attempts = state.backoff.attempts();
                error!("Job stream failed ({}), giving up after {} reconnects", err, attempts);
                let terminal = StreamError::ReconnectExhausted { attempts };
                state.last_error = Some(terminal.clone());
                state.cancel = None;
                self.set_connection(state, ConnectionState::Error);
                self.publish(StreamUpdate::Error(terminal));
                None
            }
        }
    }

    fn expire_session(&self, generation: u64) {
        self.with_current(generation, |state| {
            warn!("Job stream rejected with 401, session expired");
            state.last_error = Some(StreamError::Unauthorized);
            state.cancel = None;
            self.publish(StreamUpdate::SessionExpired);
            self.set_connection(state, ConnectionState::Error);
        });
    }

    async fn stream_once(&self, generation: u64, url: &str) -> StreamEnd {
        let response = match self.http.get_stream(url, &self.request_headers()).await {
            Ok(response) => response,
            Err(HttpError::Cancelled) => return StreamEnd::Cancelled,
            Err(err) if err.is_unauthorized() => return StreamEnd::Unauthorized,
            Err(err) => return StreamEnd::Failed(err.into()),
        };

        if response.status == 401 {
            return StreamEnd::Unauthorized;
        }
        if !response.is_success() {
            return StreamEnd::Failed(StreamError::HttpStatus {
                status: response.status,
            });
        }
        let mut body = match response.body {
            Some(body) => body,
            None => return StreamEnd::Failed(StreamError::MissingBody),
        };

        let connected = self.with_current(generation, |state| {
            state.backoff.reset();
            state.last_error = None;
            self.set_connection(state, ConnectionState::Connected);
        });
        if connected.is_none() {
            return StreamEnd::Cancelled;
        }
        info!("Job stream connected: {}", url);

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    for raw in decoder.feed(&bytes) {
                        self.dispatch(generation, &raw);
                    }
                }
                Err(HttpError::Cancelled) => return StreamEnd::Cancelled,
                Err(err) => {
                    return StreamEnd::Failed(StreamError::ConnectionLost {
                        message: err.to_string(),
                    })
                }
            }
        }
        for raw in decoder.finish() {
            self.dispatch(generation, &raw);
        }

        StreamEnd::Failed(StreamError::ServerClosed)
    }

    fn dispatch(&self, generation: u64, raw: &RawSseEvent) {
        let event = match parse_job_event(raw) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!("Ignoring '{}' event", raw.event);
                return;
            }
            Err(e) => {
                warn!("Dropping malformed event: {}", e);
                return;
            }
        };
        trace!("Dispatching {} event", event.event_type_name());

        self.with_current(generation, |state| match event {
            JobEvent::JobUpdate(job) => {
                let change = state.jobs.apply_update(job.clone());
                if change == JobChange::Inserted {
                    debug!("New job {} ({})", job.job_id, job.status.as_str());
                }
                self.publish(StreamUpdate::JobUpdate(job));
            }
            JobEvent::StatusSummary(summary) => {
                state.summary = Some(summary.clone());
                self.publish(StreamUpdate::StatusSummary(summary));
            }
            JobEvent::Error { error, details } => {
                warn!("Job stream reported error: {}", error);
                let err = StreamError::Server {
                    message: error,
                    details,
                };
                state.last_error = Some(err.clone());
                self.publish(StreamUpdate::Error(err));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockClock, MockHttpClient, MockStream};
    use crate::jobs::ReconnectPolicy;
    use crate::models::JobStatus;
    use bytes::Bytes;
    use std::time::Duration;

    const JOB_A: &str = r#"{"job_id":"a","scope":"sync","status":"running","attempts":1,"max_attempts":3,"entities_updated":0,"created_at":"2026-01-05T10:00:00Z"}"#;
    const JOB_A_DONE: &str = r#"{"job_id":"a","scope":"sync","status":"done","attempts":1,"max_attempts":3,"entities_updated":9,"created_at":"2026-01-05T10:00:00Z"}"#;
    const JOB_B: &str = r#"{"job_id":"b","scope":"sync","status":"pending","attempts":0,"max_attempts":3,"entities_updated":0,"created_at":"2026-01-05T10:01:00Z"}"#;

    fn event(name: &str, data: &str) -> Bytes {
        Bytes::from(format!("event: {}\ndata: {}\n\n", name, data))
    }

    fn client(http: &MockHttpClient, clock: &MockClock) -> EventStreamClient<MockHttpClient, MockClock> {
        EventStreamClient::new(http.clone(), clock.clone(), &SyncConfig::default())
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..2000 {
            if condition() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition not reached");
    }

    async fn next_update(rx: &mut broadcast::Receiver<StreamUpdate>) -> StreamUpdate {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for update")
            .expect("update channel closed")
    }

    #[tokio::test]
    async fn test_dispatches_updates_in_order() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::Open(vec![
            event("job_update", JOB_A),
            event("job_update", JOB_B),
            Bytes::from(": keep-alive\n\n"),
            event("job_update", JOB_A_DONE),
        ]));
        let client = client(&http, &clock);
        let mut rx = client.subscribe();
        client.connect();

        assert_eq!(
            next_update(&mut rx).await,
            StreamUpdate::ConnectionChanged(ConnectionState::Connecting)
        );
        assert_eq!(
            next_update(&mut rx).await,
            StreamUpdate::ConnectionChanged(ConnectionState::Connected)
        );
        for expected in ["a", "b", "a"] {
            match next_update(&mut rx).await {
                StreamUpdate::JobUpdate(job) => assert_eq!(job.job_id, expected),
                other => panic!("Expected JobUpdate, got {:?}", other),
            }
        }

        let jobs = client.jobs();
        let ids: Vec<_> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(jobs[1].status, JobStatus::Done);
        assert_eq!(jobs[1].entities_updated, 9);
        client.disconnect();
    }

    #[tokio::test]
    async fn test_request_carries_stream_headers() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::Open(vec![]));
        let config = SyncConfig::default().with_session_cookie("session=abc");
        let client = EventStreamClient::new(http.clone(), clock.clone(), &config);
        client.connect();
        wait_until(|| client.connection_state() == ConnectionState::Connected).await;

        let requests = http.get_requests();
        assert_eq!(requests[0].url, "http://localhost:8000/connectors/jobs/stream");
        assert_eq!(
            requests[0].headers.get("Accept").map(String::as_str),
            Some("text/event-stream")
        );
        assert_eq!(
            requests[0].headers.get("Cookie").map(String::as_str),
            Some("session=abc")
        );
        client.disconnect();
    }

    #[tokio::test]
    async fn test_summary_replaces_previous() {
        let summary_one = r#"{"has_running":true,"running_count":1,"running_jobs":[],"recent_completed":[],"grouped":{},"timestamp":"2026-01-05T10:00:00Z"}"#;
        let summary_two = r#"{"has_running":false,"running_count":0,"running_jobs":[],"recent_completed":[],"timestamp":"2026-01-05T10:05:00Z"}"#;
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::Open(vec![
            event("status_summary", summary_one),
            event("status_summary", summary_two),
        ]));
        let client = client(&http, &clock);
        client.connect();
        wait_until(|| {
            client
                .summary()
                .map(|s| !s.has_running && s.running_count == 0)
                .unwrap_or(false)
        })
        .await;
        client.disconnect();
    }

    #[tokio::test]
    async fn test_malformed_event_dropped_stream_continues() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::Open(vec![
            event("job_update", "{broken"),
            event("job_update", JOB_B),
        ]));
        let client = client(&http, &clock);
        client.connect();
        wait_until(|| client.jobs().len() == 1).await;
        assert_eq!(client.connection_state(), ConnectionState::Connected);
        assert!(clock.sleeps().is_empty());
        client.disconnect();
    }

    #[tokio::test]
    async fn test_error_event_does_not_reconnect() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::Open(vec![event(
            "error",
            r#"{"error":"connector offline","details":"gmail"}"#,
        )]));
        let client = client(&http, &clock);
        let mut rx = client.subscribe();
        client.connect();

        loop {
            if let StreamUpdate::Error(err) = next_update(&mut rx).await {
                assert_eq!(
                    err,
                    StreamError::Server {
                        message: "connector offline".to_string(),
                        details: Some("gmail".to_string()),
                    }
                );
                break;
            }
        }
        assert_eq!(client.connection_state(), ConnectionState::Connected);
        assert_eq!(http.get_requests().len(), 1);
        client.disconnect();
    }

    #[tokio::test]
    async fn test_backoff_sequence_until_exhausted() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.set_default_stream(MockStream::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));
        let client = client(&http, &clock);
        let mut rx = client.subscribe();
        client.connect();

        let terminal = loop {
            if let StreamUpdate::Error(err) = next_update(&mut rx).await {
                break err;
            }
        };
        assert_eq!(terminal, StreamError::ReconnectExhausted { attempts: 10 });
        assert_eq!(client.connection_state(), ConnectionState::Error);

        let delays: Vec<u64> = clock.sleeps().iter().map(|d| d.as_millis() as u64).collect();
        assert_eq!(
            delays,
            vec![1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000, 30000, 30000]
        );
        assert_eq!(http.get_requests().len(), 11);
    }

    #[tokio::test]
    async fn test_success_resets_attempt_counter() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::Error(HttpError::Timeout("5s".to_string())));
        http.push_stream(MockStream::Closed(vec![event("job_update", JOB_A)]));
        http.push_stream(MockStream::Status(503));
        http.set_default_stream(MockStream::Open(vec![]));
        let client = client(&http, &clock);
        client.connect();

        wait_until(|| http.get_requests().len() == 4 && client.connection_state() == ConnectionState::Connected).await;
        let delays: Vec<u64> = clock.sleeps().iter().map(|d| d.as_millis() as u64).collect();
        assert_eq!(delays, vec![1000, 1000, 2000]);
        assert_eq!(client.attempts(), 0);
        client.disconnect();
    }

    #[tokio::test]
    async fn test_unauthorized_stops_without_retry() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::Status(401));
        let client = client(&http, &clock);
        let mut rx = client.subscribe();
        client.connect();

        let mut expired = 0;
        loop {
            match next_update(&mut rx).await {
                StreamUpdate::SessionExpired => expired += 1,
                StreamUpdate::ConnectionChanged(ConnectionState::Error) => break,
                _ => {}
            }
        }
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        while let Ok(update) = rx.try_recv() {
            assert_ne!(update, StreamUpdate::SessionExpired);
        }
        assert_eq!(expired, 1);
        assert!(clock.sleeps().is_empty());
        assert_eq!(http.get_requests().len(), 1);
        assert_eq!(client.last_error(), Some(StreamError::Unauthorized));
    }

    #[tokio::test]
    async fn test_missing_body_is_a_failure() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.push_stream(MockStream::NoBody);
        http.set_default_stream(MockStream::Open(vec![]));
        let client = client(&http, &clock);
        client.connect();
        wait_until(|| http.get_requests().len() == 2).await;
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(1000)]);
        client.disconnect();
    }

    #[tokio::test]
    async fn test_disconnect_then_reconnect() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.set_default_stream(MockStream::Open(vec![]));
        let client = client(&http, &clock);
        let mut rx = client.subscribe();
        client.connect();
        wait_until(|| client.connection_state() == ConnectionState::Connected).await;

        client.disconnect();
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        client.disconnect();

        let mut changes = Vec::new();
        while let Ok(update) = rx.try_recv() {
            if let StreamUpdate::ConnectionChanged(state) = update {
                changes.push(state);
            }
        }
        assert_eq!(
            changes,
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Disconnected
            ]
        );
        assert!(clock.sleeps().is_empty());

        client.reconnect();
        assert_eq!(client.attempts(), 0);
        wait_until(|| client.connection_state() == ConnectionState::Connected).await;
        assert_eq!(http.get_requests().len(), 2);
        client.disconnect();
    }

    #[tokio::test]
    async fn test_disconnect_while_connecting() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        let gate = http.push_gated_stream();
        let client = client(&http, &clock);
        let mut rx = client.subscribe();
        client.connect();
        wait_until(|| http.get_requests().len() == 1).await;
        assert_eq!(client.connection_state(), ConnectionState::Connecting);

        client.disconnect();
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);

        let _ = gate.send(MockStream::Open(vec![event("job_update", JOB_A)]));
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }

        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert!(client.jobs().is_empty());
        assert!(clock.sleeps().is_empty());
        assert_eq!(http.get_requests().len(), 1);
        let mut changes = Vec::new();
        while let Ok(update) = rx.try_recv() {
            match update {
                StreamUpdate::ConnectionChanged(state) => changes.push(state),
                other => panic!("unexpected update {:?}", other),
            }
        }
        assert_eq!(
            changes,
            vec![ConnectionState::Connecting, ConnectionState::Disconnected]
        );
    }

    #[tokio::test]
    async fn test_disconnect_cancels_pending_reconnect() {
        let http = MockHttpClient::new();
        let clock = MockClock::new().with_parked_sleeps();
        http.push_stream(MockStream::Status(500));
        let client = client(&http, &clock);
        client.connect();
        wait_until(|| clock.sleeps().len() == 1).await;

        client.disconnect();
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(http.get_requests().len(), 1);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_reconnect_after_exhaustion_starts_over() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        let policy = ReconnectPolicy {
            max_attempts: 2,
            ..ReconnectPolicy::default()
        };
        http.push_stream(MockStream::Status(500));
        http.push_stream(MockStream::Status(500));
        http.push_stream(MockStream::Status(500));
        http.set_default_stream(MockStream::Open(vec![]));
        let config = SyncConfig::default().with_reconnect(policy);
        let client = EventStreamClient::new(http.clone(), clock.clone(), &config);
        client.connect();
        wait_until(|| client.connection_state() == ConnectionState::Error).await;
        assert!(client.last_error().is_some());

        client.reconnect();
        assert!(client.last_error().is_none());
        wait_until(|| client.connection_state() == ConnectionState::Connected).await;
        assert_eq!(http.get_requests().len(), 4);
        client.disconnect();
    }

    #[tokio::test]
    async fn test_filter_change_forces_reconnect() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        http.set_default_stream(MockStream::Open(vec![]));
        let client = client(&http, &clock);
        client.connect();
        wait_until(|| client.connection_state() == ConnectionState::Connected).await;

        client.set_filter(JobFilter::new().with_connector_id("c-7"));
        wait_until(|| http.get_requests().len() == 2).await;
        wait_until(|| client.connection_state() == ConnectionState::Connected).await;

        let requests = http.get_requests();
        assert!(requests[1].url.ends_with("?connector_id=c-7"));
        // The aborted connection is not treated as a failure
        assert!(clock.sleeps().is_empty());

        client.set_filter(JobFilter::new().with_connector_id("c-7"));
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(http.get_requests().len(), 2);
        client.disconnect();
    }

    #[tokio::test]
    async fn test_filter_change_while_disconnected_does_not_connect() {
        let http = MockHttpClient::new();
        let clock = MockClock::new();
        let client = client(&http, &clock);
        client.disconnect();
        client.set_filter(JobFilter::new().with_connector_type("slack"));
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(http.get_requests().is_empty());
        assert_eq!(client.filter().connector_type.as_deref(), Some("slack"));
    }
}
