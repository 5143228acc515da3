use std::fs::File;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Sync capability of the wrapped stream.
pub type SyncFn<W> = fn(&mut W) -> io::Result<()>;

/// Serializes writes to `W` so concurrent callers never interleave bytes.
///
/// Every [`write`](Self::write) delivers its whole buffer while holding the
/// lock, and [`sync`](Self::sync) takes the same lock, so writes and syncs
/// form a single total order. Nothing is buffered here.
///
/// A write that stops partway, by error or by a panic in the stream, leaves
/// a torn fragment. The next write terminates it with `\n` first, so the
/// fragment never merges with the following entry.
pub struct SyncWriter<W> {
    inner: Mutex<Inner<W>>,
    sync: SyncFn<W>,
}

struct Inner<W> {
    w: W,
    /// Some bytes of the last write reached the stream, but not all of them.
    torn: bool,
}

impl<W: Write> Inner<W> {
    fn write_tracked(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.w.write(buf) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => {
                    self.torn = true;
                    buf = &buf[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        self.torn = false;
        Ok(())
    }
}

impl<W: Write> SyncWriter<W> {
    /// Wrap `w`, using [`Write::flush`] as its sync capability.
    ///
    /// For streams that don't buffer (an in-memory `Vec<u8>`, a raw socket)
    /// this makes [`sync`](Self::sync) a successful no-op. Note that
    /// `File::flush` does not reach the disk; use [`SyncWriter::file`].
    pub fn new(w: W) -> Self {
        Self::with_sync(w, W::flush)
    }

    /// Wrap `w` with a custom sync capability.
    pub fn with_sync(w: W, sync: SyncFn<W>) -> Self {
        Self {
            inner: Mutex::new(Inner { w, torn: false }),
            sync,
        }
    }

    /// Write all of `buf` as one contiguous run.
    pub fn write(&self, buf: &[u8]) -> io::Result<()> {
        let mut inner = self.lock();
        if inner.torn {
            inner.write_tracked(b"\n")?;
        }
        inner.write_tracked(buf)
    }

    /// Run the sync capability under the write lock.
    pub fn sync(&self) -> io::Result<()> {
        let mut inner = self.lock();
        (self.sync)(&mut inner.w)
    }

    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .w
    }

    // Poisoning only means a write panicked; the torn flag already covers
    // what it may have left behind.
    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SyncWriter<File> {
    /// Wrap a file so that [`sync`](Self::sync) commits its data to disk.
    pub fn file(file: File) -> Self {
        Self::with_sync(file, |f| f.sync_all())
    }
}
