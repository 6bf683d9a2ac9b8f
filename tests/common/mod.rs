//! Common test utilities for integration tests.
//!
//! Fixtures for job payloads and event-stream bodies, plus a polling helper
//! for conditions that settle asynchronously.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};

/// Serialized job as carried by a `job_update` event.
pub fn job_json(job_id: &str, status: &str) -> Value {
    json!({
        "job_id": job_id,
        "scope": "sync",
        "status": status,
        "connector_id": "c-1",
        "connector_type": "gmail",
        "attempts": 1,
        "max_attempts": 3,
        "entities_updated": 0,
        "created_at": "2026-01-05T10:00:00Z"
    })
}

pub fn summary_json(running_count: u32) -> Value {
    json!({
        "has_running": running_count > 0,
        "running_count": running_count,
        "running_jobs": [],
        "recent_completed": [],
        "grouped": {},
        "timestamp": "2026-01-05T10:00:00Z"
    })
}

/// Builder for an event-stream response body.
#[derive(Default)]
pub struct SseBody {
    body: String,
}

impl SseBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, name: &str, data: &Value) -> Self {
        self.body.push_str(&format!("event: {}\ndata: {}\n\n", name, data));
        self
    }

    pub fn raw(mut self, text: &str) -> Self {
        self.body.push_str(text);
        self
    }

    pub fn build(self) -> String {
        self.body
    }
}

/// Message records as served by the thread-state endpoint.
pub fn messages_json(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| json!({ "id": id, "role": "assistant", "content": format!("text of {}", id) }))
            .collect(),
    )
}

/// Poll `condition` until it holds, panicking after five seconds.
pub async fn wait_for(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
