use serde::{Deserialize, Serialize};

/// Opaque conversation record.
///
/// The thread-state service owns the shape of a message; this crate only
/// keeps the fetched list in order and replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Message(serde_json::Value);

impl Message {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Server-assigned id, if the record carries one.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(|v| v.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.0
            .get("role")
            .or_else(|| self.0.get("type"))
            .and_then(|v| v.as_str())
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}
