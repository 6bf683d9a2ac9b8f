//! Job event stream.
//!
//! [`EventStreamClient`] holds one streaming connection to the job stream
//! endpoint, keeps the job list and latest summary, and publishes every
//! change as a [`StreamUpdate`] on a single broadcast channel.

mod backoff;
mod client;
mod filter;
mod store;

pub use backoff::{Backoff, ReconnectPolicy};
pub use client::{EventStreamClient, StreamUpdate};
pub use filter::JobFilter;
pub use store::{JobChange, JobStore};
