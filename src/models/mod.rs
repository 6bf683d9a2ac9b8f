//! Data records shared by the synchronization components.
//!
//! - [`Job`] / [`StatusSummary`] - payloads of the job event stream
//! - [`Message`] - opaque conversation record fetched per thread
//! - [`ThreadSelection`] - the thread id currently selected by the session

mod job;
mod message;
mod selection;

pub use job::{Job, JobStatus, StatusSummary};
pub use message::Message;
pub use selection::ThreadSelection;
