use std::io;

/// Error returned by [`LogSink`](crate::sink::LogSink) operations.
///
/// Each variant carries the underlying cause as its `source`, so callers can
/// tell an unrepresentable entry apart from a failing output stream.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("json sink: failed to encode entry to JSON")]
    Encode(#[source] serde_json::Error),

    #[error("json sink: failed to write JSON entry")]
    Write(#[source] io::Error),

    #[error("json sink: failed to sync writer")]
    Sync(#[source] io::Error),
}
