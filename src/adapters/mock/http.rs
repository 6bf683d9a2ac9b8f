//! Mock HTTP client for testing.
//!
//! Plain requests are answered from per-URL responses, a FIFO queue, or a
//! default. Streaming requests are answered from a FIFO of [`MockStream`]
//! scripts, falling back to a default script once the queue is empty.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::traits::{Headers, HttpClient, HttpError, Response, StreamingResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// `GET` or `GET (stream)`
    pub method: String,
    pub url: String,
    pub headers: Headers,
}

/// Configuration for a plain mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(Response),
    Error(HttpError),
}

/// Script for one streaming request.
#[derive(Debug, Clone)]
pub enum MockStream {
    /// Respond with this status and an empty body
    Status(u16),
    /// 200, deliver the chunks, then keep the connection open
    Open(Vec<Bytes>),
    /// 200, deliver the chunks, then end the stream
    Closed(Vec<Bytes>),
    /// 200, deliver the chunks, then fail the body with this error
    Broken(Vec<Bytes>, HttpError),
    /// 200 without a body
    NoBody,
    /// The request itself fails
    Error(HttpError),
}

#[derive(Debug)]
enum StreamReply {
    Ready(MockStream),
    /// Held until the test sends the script; a dropped sender fails the request
    Gated(oneshot::Receiver<MockStream>),
}

/// Mock HTTP client for testing.
///
/// Clones share configuration and recorded requests.
///
/// # Example
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.push_stream(MockStream::Status(503));
/// client.set_default_stream(MockStream::Open(vec![]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    queued: Arc<Mutex<VecDeque<MockResponse>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    streams: Arc<Mutex<VecDeque<StreamReply>>>,
    default_stream: Arc<Mutex<Option<MockStream>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL, matched exactly or by prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Queue a response for the next plain request, whatever its URL.
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.queued).push_back(response);
    }

    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Queue a script for the next streaming request.
    pub fn push_stream(&self, stream: MockStream) {
        lock(&self.streams).push_back(StreamReply::Ready(stream));
    }

    /// Queue a streaming request that stays in flight until the returned
    /// sender delivers its script.
    pub fn push_gated_stream(&self) -> oneshot::Sender<MockStream> {
        let (tx, rx) = oneshot::channel();
        lock(&self.streams).push_back(StreamReply::Gated(rx));
        tx
    }

    pub fn set_default_stream(&self, stream: MockStream) {
        *lock(&self.default_stream) = Some(stream);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers) {
        lock(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        {
            let responses = lock(&self.responses);
            if let Some(response) = responses.get(url) {
                return Some(response.clone());
            }
            for (pattern, response) in responses.iter() {
                if url.starts_with(pattern) {
                    return Some(response.clone());
                }
            }
        }
        if let Some(response) = lock(&self.queued).pop_front() {
            return Some(response);
        }
        lock(&self.default_response).clone()
    }

    async fn next_stream(&self) -> Option<MockStream> {
        let reply = lock(&self.streams).pop_front();
        match reply {
            Some(StreamReply::Ready(stream)) => Some(stream),
            Some(StreamReply::Gated(rx)) => Some(rx.await.unwrap_or_else(|_| {
                MockStream::Error(HttpError::Other("gate dropped".to_string()))
            })),
            None => lock(&self.default_stream).clone(),
        }
    }
}

fn body_of(
    chunks: Vec<Bytes>,
    tail: impl futures::Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
) -> StreamingResponse {
    let body = futures::stream::iter(chunks.into_iter().map(Ok)).chain(tail);
    StreamingResponse {
        status: 200,
        headers: Headers::new(),
        body: Some(Box::pin(body)),
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers);

        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<StreamingResponse, HttpError> {
        self.record_request("GET (stream)", url, headers);

        match self.next_stream().await {
            Some(MockStream::Status(status)) => Ok(StreamingResponse {
                status,
                headers: Headers::new(),
                body: Some(Box::pin(futures::stream::empty())),
            }),
            Some(MockStream::Open(chunks)) => Ok(body_of(chunks, futures::stream::pending())),
            Some(MockStream::Closed(chunks)) => Ok(body_of(chunks, futures::stream::empty())),
            Some(MockStream::Broken(chunks, err)) => {
                Ok(body_of(chunks, futures::stream::once(async move { Err(err) })))
            }
            Some(MockStream::NoBody) => Ok(StreamingResponse {
                status: 200,
                headers: Headers::new(),
                body: None,
            }),
            Some(MockStream::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock stream for URL: {}", url))),
        }
    }
}
