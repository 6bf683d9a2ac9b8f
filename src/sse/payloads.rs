//! SSE payload deserialization structs

use serde::Deserialize;

/// Payload of an in-stream `error` event
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}
