//! Mock implementations for testing.
//!
//! Test doubles for every trait seam, so the synchronization components can
//! be driven without a network or real time.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - scripted plain and streaming responses
//! - [`MockClock`] - virtual time with recorded sleeps
//! - [`MockThreadStateClient`] - scripted message lists
//! - [`MockSubmitter`] - scripted submission outcomes

pub mod clock;
pub mod http;
pub mod submitter;
pub mod thread_state;

pub use clock::MockClock;
pub use http::{MockHttpClient, MockResponse, MockStream, RecordedRequest};
pub use submitter::MockSubmitter;
pub use thread_state::MockThreadStateClient;
