use crate::error::SinkError;
use crate::record::LogEntry;
use std::sync::Arc;

/// Synchronous destination for [`LogEntry`]s.
///
/// Implementations format and deliver entries on the caller's thread. They
/// must be safe to call from many threads at once and must not log their own
/// failures through the logging system that feeds them.
pub trait LogSink: Send + Sync {
    /// Format and deliver a single entry.
    ///
    /// **Returns**
    /// - `Ok(())` once the entry has been handed to the output stream.
    /// - `Err(SinkError::Encode)` if the entry can't be rendered.
    /// - `Err(SinkError::Write)` if the output stream rejected it.
    ///
    /// Nothing is retried; the caller decides whether to drop the entry or
    /// fall back to another destination.
    fn log_entry(&self, entry: &LogEntry) -> Result<(), SinkError>;

    /// Ask the output stream to deliver everything written so far.
    ///
    /// Default implementation is a no-op.
    fn sync(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn log_entry(&self, entry: &LogEntry) -> Result<(), SinkError> {
        (**self).log_entry(entry)
    }

    fn sync(&self) -> Result<(), SinkError> {
        (**self).sync()
    }
}
