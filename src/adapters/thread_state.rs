//! HTTP implementation of the thread-state service.

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;
use crate::models::Message;
use crate::traits::{Headers, HttpClient, HttpError, ThreadStateClient};

/// Fetches `GET {base}/threads/{thread_id}/messages`.
#[derive(Debug, Clone)]
pub struct HttpThreadStateClient<H: HttpClient> {
    http: H,
    base_url: String,
    session_cookie: Option<String>,
}

impl<H: HttpClient> HttpThreadStateClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie: None,
        }
    }

    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie;
        self
    }

    fn messages_url(&self, thread_id: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Http(HttpError::InvalidUrl(e.to_string())))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Http(HttpError::InvalidUrl(self.base_url.clone())))?
            .pop_if_empty()
            .extend(["threads", thread_id, "messages"]);
        Ok(url)
    }
}

#[async_trait]
impl<H: HttpClient> ThreadStateClient for HttpThreadStateClient<H> {
    async fn fetch_messages(&self, thread_id: &str) -> Result<Vec<Message>, FetchError> {
        let url = self.messages_url(thread_id)?;

        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        if let Some(cookie) = &self.session_cookie {
            headers.insert("Cookie".to_string(), cookie.clone());
        }

        let response = self.http.get(url.as_str(), &headers).await?;
        if response.status == 401 {
            return Err(FetchError::Unauthorized);
        }
        if !response.is_success() {
            return Err(FetchError::Http(HttpError::ServerError {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).into_owned(),
            }));
        }

        let messages: Vec<Message> = response.json()?;
        debug!("Fetched {} messages for thread {}", messages.len(), thread_id);
        Ok(messages)
    }
}
