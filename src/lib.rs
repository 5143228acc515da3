//! Synchronous `tracing` sink that writes every log entry as one line of
//! JSON to any [`std::io::Write`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracing_json_sink::{init::init_tracing, JsonSink};
//!
//! init_tracing(Arc::new(JsonSink::stdout())).expect("no other global subscriber");
//! tracing::info!(user_id = 42, "logged in");
//! ```

pub mod encode;
pub mod error;
mod finite;
pub mod init;
pub mod json_sink;
pub mod layer;
pub mod record;
pub mod sink;
pub mod writer;

pub use encode::encode;
pub use error::SinkError;
pub use json_sink::JsonSink;
pub use record::LogEntry;
pub use sink::LogSink;
