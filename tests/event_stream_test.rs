//! Job stream client against a real HTTP server.

mod common;

use std::time::Duration;

use common::{job_json, summary_json, wait_for, SseBody};
use serde_json::json;
use session_sync::adapters::mock::MockClock;
use session_sync::adapters::ReqwestHttpClient;
use session_sync::config::SyncConfig;
use session_sync::domain::ConnectionState;
use session_sync::error::StreamError;
use session_sync::jobs::{EventStreamClient, JobFilter, StreamUpdate};
use session_sync::models::JobStatus;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event_stream(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

fn client_for(
    server: &MockServer,
    clock: &MockClock,
) -> EventStreamClient<ReqwestHttpClient, MockClock> {
    let config = SyncConfig::default().with_base_url(server.uri());
    EventStreamClient::new(ReqwestHttpClient::new().unwrap(), clock.clone(), &config)
}

#[tokio::test]
async fn test_stream_updates_job_list_and_summary() {
    let server = MockServer::start().await;
    let body = SseBody::new()
        .raw(": connected\n\n")
        .event("job_update", &job_json("j1", "running"))
        .event("job_update", &job_json("j2", "pending"))
        .event("status_summary", &summary_json(1))
        .event("heartbeat", &json!({}))
        .event("job_update", &job_json("j1", "done"))
        .build();
    Mock::given(method("GET"))
        .and(path("/connectors/jobs/stream"))
        .and(header("accept", "text/event-stream"))
        .respond_with(event_stream(body))
        .mount(&server)
        .await;

    let clock = MockClock::new().with_parked_sleeps();
    let client = client_for(&server, &clock);
    client.connect();

    // The server closes the body; the client then waits to reconnect
    wait_for("reconnect to be scheduled", || clock.sleeps().len() == 1).await;

    let jobs = client.jobs();
    let ids: Vec<_> = jobs.iter().map(|j| j.job_id.as_str()).collect();
    assert_eq!(ids, vec!["j2", "j1"]);
    assert_eq!(jobs[1].status, JobStatus::Done);
    assert_eq!(client.summary().unwrap().running_count, 1);
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(1000)]);
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);

    client.disconnect();
}

#[tokio::test]
async fn test_filter_is_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors/jobs/stream"))
        .and(query_param("connector_id", "c-1"))
        .and(query_param("connector_type", "gmail"))
        .respond_with(event_stream(
            SseBody::new()
                .event("job_update", &job_json("j1", "running"))
                .build(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let clock = MockClock::new().with_parked_sleeps();
    let config = SyncConfig::default().with_base_url(server.uri());
    let filter = JobFilter::new()
        .with_connector_id("c-1")
        .with_connector_type("gmail");
    let client = EventStreamClient::with_filter(
        ReqwestHttpClient::new().unwrap(),
        clock.clone(),
        &config,
        filter,
    );
    client.connect();

    wait_for("job from filtered stream", || client.jobs().len() == 1).await;
    client.disconnect();
}

#[tokio::test]
async fn test_unauthorized_signals_session_expiry_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors/jobs/stream"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let clock = MockClock::new();
    let client = client_for(&server, &clock);
    let mut updates = client.subscribe();
    client.connect();

    wait_for("error state", || {
        client.connection_state() == ConnectionState::Error
    })
    .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut expired = 0;
    while let Ok(update) = updates.try_recv() {
        if update == StreamUpdate::SessionExpired {
            expired += 1;
        }
    }
    assert_eq!(expired, 1);
    assert!(clock.sleeps().is_empty());
    assert_eq!(client.last_error(), Some(StreamError::Unauthorized));
}

#[tokio::test]
async fn test_server_errors_exhaust_reconnects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors/jobs/stream"))
        .respond_with(ResponseTemplate::new(503))
        .expect(11)
        .mount(&server)
        .await;

    let clock = MockClock::new();
    let client = client_for(&server, &clock);
    client.connect();

    wait_for("reconnects to give up", || {
        client.connection_state() == ConnectionState::Error
    })
    .await;

    let delays: Vec<u64> = clock.sleeps().iter().map(|d| d.as_millis() as u64).collect();
    assert_eq!(
        delays,
        vec![1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000, 30000, 30000]
    );
    assert_eq!(
        client.last_error(),
        Some(StreamError::ReconnectExhausted { attempts: 10 })
    );
}

#[tokio::test]
async fn test_in_stream_error_event_is_published() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connectors/jobs/stream"))
        .respond_with(event_stream(
            SseBody::new()
                .event("error", &json!({"error": "connector offline"}))
                .build(),
        ))
        .mount(&server)
        .await;

    let clock = MockClock::new().with_parked_sleeps();
    let client = client_for(&server, &clock);
    let mut updates = client.subscribe();
    client.connect();

    let err = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(StreamUpdate::Error(err)) = updates.recv().await {
                return err;
            }
        }
    })
    .await
    .expect("error event not published");

    assert_eq!(
        err,
        StreamError::Server {
            message: "connector offline".to_string(),
            details: None
        }
    );
    client.disconnect();
}
