//! session-sync - client-side synchronization for a case/session workspace.
//!
//! - [`jobs::EventStreamClient`] follows the server's job event stream with
//!   backoff reconnection
//! - [`messages::MessageSynchronizer`] keeps a thread's message list current
//!   with retried, cancellable fetches
//! - [`resume::ResumeController`] resumes an interrupted turn, falling back
//!   to a new thread when the old one cannot be resumed
//!
//! All network, time and submission access goes through the traits in
//! [`traits`]; production adapters and test doubles live in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod jobs;
pub mod messages;
pub mod models;
pub mod resume;
pub mod sse;
pub mod traits;
