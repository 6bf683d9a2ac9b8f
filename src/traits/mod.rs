//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP operations (GET, streaming GET)
//! - [`Clock`] - current time and cooperative sleeping
//! - [`ThreadStateClient`] - canonical message list of a thread
//! - [`Submitter`] - opening a new remote turn against a case/thread

pub mod clock;
pub mod http;
pub mod submission;
pub mod thread_state;

pub use clock::Clock;
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response, StreamingResponse};
pub use submission::{SubmissionOutcome, SubmissionRequest, Submitter};
pub use thread_state::ThreadStateClient;
