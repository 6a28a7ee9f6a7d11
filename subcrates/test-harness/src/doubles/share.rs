use std::{
    io::{Cursor, Read, Write},
    sync::{Arc, Mutex},
};

use fs_transfer::location::NetworkShareFile;

use super::HandleTracker;

/// A network-share file kept in memory.
///
/// Clones share the same content and tracker, so a test can hand one clone
/// to a copy and inspect the other afterwards.
#[derive(Clone, Debug)]
pub struct InMemoryShareFile {
    path: String,
    contents: Arc<Mutex<Vec<u8>>>,
    tracker: HandleTracker,
    accepted_write_bytes: Option<usize>,
    chunked_reads: Option<usize>,
}

impl InMemoryShareFile {
    /// An empty file at `path` (e.g. `smb://nas/share/file.bin`).
    pub fn new<S>(path: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_contents(path, Vec::new())
    }

    /// A file at `path` holding `contents`.
    pub fn with_contents<S>(path: S, contents: Vec<u8>) -> Self
    where
        S: Into<String>,
    {
        Self {
            path: path.into(),
            contents: Arc::new(Mutex::new(contents)),
            tracker: HandleTracker::new(),
            accepted_write_bytes: None,
            chunked_reads: None,
        }
    }

    /// Makes output streams fail once `bytes` bytes have been written to them,
    /// as if the share became unreachable mid-transfer.
    pub fn failing_after(mut self, bytes: usize) -> Self {
        self.accepted_write_bytes = Some(bytes);
        self
    }

    /// Makes input streams return at most `bytes` bytes per read,
    /// like a slow network connection would.
    pub fn with_chunked_reads(mut self, bytes: usize) -> Self {
        self.chunked_reads = Some(bytes);
        self
    }

    /// A copy of the file's current contents.
    pub fn contents(&self) -> Vec<u8> {
        self.lock_contents().clone()
    }

    pub fn tracker(&self) -> &HandleTracker {
        &self.tracker
    }

    fn lock_contents(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NetworkShareFile for InMemoryShareFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn open_input_stream(&self) -> std::io::Result<Box<dyn Read + Send>> {
        let reader = ChunkedReader {
            inner: Cursor::new(self.contents()),
            max_chunk: self.chunked_reads,
        };

        Ok(Box::new(self.tracker.track(reader)))
    }

    fn open_output_stream(&self) -> std::io::Result<Box<dyn Write + Send>> {
        self.lock_contents().clear();

        let writer = ShareWriter {
            contents: self.contents.clone(),
            remaining_bytes: self.accepted_write_bytes,
        };

        Ok(Box::new(self.tracker.track(writer)))
    }
}


struct ChunkedReader {
    inner: Cursor<Vec<u8>>,
    max_chunk: Option<usize>,
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let limit = match self.max_chunk {
            Some(max_chunk) => buf.len().min(max_chunk),
            None => buf.len(),
        };

        self.inner.read(&mut buf[..limit])
    }
}


struct ShareWriter {
    contents: Arc<Mutex<Vec<u8>>>,
    remaining_bytes: Option<usize>,
}

impl Write for ShareWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let accepted = match self.remaining_bytes {
            Some(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "network share went away",
                ));
            }
            Some(remaining) => buf.len().min(remaining),
            None => buf.len(),
        };

        if let Some(remaining) = self.remaining_bytes.as_mut() {
            *remaining -= accepted;
        }

        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(&buf[..accepted]);

        Ok(accepted)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
