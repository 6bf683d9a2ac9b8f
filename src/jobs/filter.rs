use reqwest::Url;

use crate::error::ConfigError;

/// Path of the job stream endpoint below the API base URL.
pub const JOB_STREAM_PATH: &str = "/connectors/jobs/stream";

/// Optional server-side filter for the job stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub connector_id: Option<String>,
    pub connector_type: Option<String>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connector_id(mut self, connector_id: impl Into<String>) -> Self {
        self.connector_id = Some(connector_id.into());
        self
    }

    pub fn with_connector_type(mut self, connector_type: impl Into<String>) -> Self {
        self.connector_type = Some(connector_type.into());
        self
    }

    /// Stream URL for this filter. Unset fields are left out of the query.
    pub fn stream_url(&self, base_url: &str) -> Result<Url, ConfigError> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), JOB_STREAM_PATH);
        let mut url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.clone(),
            message: e.to_string(),
        })?;

        let params: Vec<(&str, &str)> = [
            ("connector_id", self.connector_id.as_deref()),
            ("connector_type", self.connector_type.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}
