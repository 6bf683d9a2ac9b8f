//! Domain state shared across components.
//!
//! - [`ConnectionState`] - lifecycle of the job event stream connection

pub mod connection;

pub use connection::ConnectionState;
