use std::{
    io::{Read, Write},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// Counts how many stream handles a double has handed out and how many of them
/// have been dropped since, so tests can assert that a copy leaked nothing.
#[derive(Clone, Debug, Default)]
pub struct HandleTracker {
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl HandleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `inner`, counting it as opened now and as closed once it is dropped.
    pub fn track<T>(&self, inner: T) -> Tracked<T> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        Tracked {
            inner,
            tracker: self.clone(),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Handles that were opened but not closed yet.
    pub fn open_handles(&self) -> usize {
        self.opened() - self.closed()
    }
}


/// A handle whose lifetime is reported to a [`HandleTracker`].
pub struct Tracked<T> {
    inner: T,
    tracker: HandleTracker,
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.tracker.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: Read> Read for Tracked<T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<T: Write> Write for Tracked<T> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
