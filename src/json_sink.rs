use crate::encode::encode;
use crate::error::SinkError;
use crate::record::LogEntry;
use crate::sink::LogSink;
use crate::writer::SyncWriter;
use std::fs::File;
use std::io::{self, IsTerminal, Stderr, Stdout, Write};

/// [`LogSink`] that writes each entry as one line of JSON. See
/// [`encode`](crate::encode) for the line format.
///
/// The `terminal` flag records whether the destination is an interactive
/// terminal. It is informational only: upstream pretty-printers may consult
/// it, but it never changes the JSON that is written.
pub struct JsonSink<W> {
    writer: SyncWriter<W>,
    terminal: bool,
}

impl<W: Write> JsonSink<W> {
    /// Bind a JSON sink to `w`. The terminal flag starts out `false`.
    ///
    /// [`sync`](LogSink::sync) flushes `w`. For a [`File`] that never reaches
    /// the disk; bind files with [`JsonSink::file`] instead.
    pub fn new(w: W) -> Self {
        Self::from_writer(SyncWriter::new(w))
    }

    /// Bind to an already configured [`SyncWriter`], e.g. one created with
    /// [`SyncWriter::file`] or [`SyncWriter::with_sync`].
    pub fn from_writer(writer: SyncWriter<W>) -> Self {
        Self {
            writer,
            terminal: false,
        }
    }

    pub fn terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Recover the wrapped stream.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + IsTerminal> JsonSink<W> {
    /// Bind to `w`, setting the terminal flag from [`IsTerminal`].
    pub fn detect(w: W) -> Self {
        let terminal = w.is_terminal();
        Self::new(w).terminal(terminal)
    }
}

impl JsonSink<File> {
    /// Bind to `file`; [`sync`](LogSink::sync) commits its data to disk.
    pub fn file(file: File) -> Self {
        Self::from_writer(SyncWriter::file(file))
    }
}

impl JsonSink<Stdout> {
    pub fn stdout() -> Self {
        Self::detect(io::stdout())
    }
}

impl JsonSink<Stderr> {
    pub fn stderr() -> Self {
        Self::detect(io::stderr())
    }
}

impl<W: Write + Send> LogSink for JsonSink<W> {
    fn log_entry(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let buf = encode(entry)?;
        self.writer.write(&buf).map_err(SinkError::Write)
    }

    fn sync(&self) -> Result<(), SinkError> {
        self.writer.sync().map_err(SinkError::Sync)
    }
}
