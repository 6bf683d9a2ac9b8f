//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`TokioClock`] - clock on the tokio timer
//! - [`HttpThreadStateClient`] - thread-state service over [`HttpClient`](crate::traits::HttpClient)
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for every seam.

pub mod mock;
pub mod reqwest_http;
pub mod thread_state;
pub mod tokio_clock;

pub use reqwest_http::ReqwestHttpClient;
pub use thread_state::HttpThreadStateClient;
pub use tokio_clock::TokioClock;
