use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use fs_transfer::location::{DescriptorMode, DocumentProvider, DocumentRef};

use super::HandleTracker;

const URI_PREFIX: &str = "content://fs-transfer-test";


/// A call made to a [`DirectoryDocumentProvider`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProviderCall {
    ResolveDocument { writable: bool },
    OpenDescriptor(DescriptorMode),
    OpenInputStream,
    OpenOutputStream,
}


struct ProviderState {
    root: PathBuf,
    descriptors_available: bool,
    calls: Mutex<Vec<ProviderCall>>,
    tracker: HandleTracker,
    descriptor_paths: Mutex<Vec<PathBuf>>,
}


/// A document provider that serves removable-storage paths from a directory,
/// e.g. `/DCIM/photo.jpg` from `<root>/DCIM/photo.jpg`.
///
/// Every call is recorded (see [`calls`][Self::calls]).
/// Clones share the same state.
#[derive(Clone)]
pub struct DirectoryDocumentProvider {
    state: Arc<ProviderState>,
}

impl DirectoryDocumentProvider {
    /// A provider that exposes raw descriptors.
    pub fn new<P>(root: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::with_descriptor_support(root, true)
    }

    /// A provider that refuses to open raw descriptors, so callers have to fall back to streams.
    pub fn without_descriptors<P>(root: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::with_descriptor_support(root, false)
    }

    fn with_descriptor_support<P>(root: P, descriptors_available: bool) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            state: Arc::new(ProviderState {
                root: root.into(),
                descriptors_available,
                calls: Mutex::new(Vec::new()),
                tracker: HandleTracker::new(),
                descriptor_paths: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Every call made to this provider so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Tracks the streams handed out by [`DocumentProvider::open_input_stream`]
    /// and [`DocumentProvider::open_output_stream`].
    pub fn tracker(&self) -> &HandleTracker {
        &self.state.tracker
    }

    /// Number of raw descriptors handed out by [`DocumentProvider::open_descriptor`].
    pub fn descriptors_opened(&self) -> usize {
        self.state
            .descriptor_paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Number of descriptors this process still holds on files this provider handed out
    /// as raw descriptors.
    ///
    /// Descriptors are plain [`File`]s, so they cannot be wrapped like streams;
    /// instead, `/proc/self/fd` is scanned for links to the files they were opened on.
    #[cfg(target_os = "linux")]
    pub fn open_descriptors(&self) -> std::io::Result<usize> {
        let descriptor_paths = self
            .state
            .descriptor_paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        let mut open_descriptors = 0;

        for entry in std::fs::read_dir("/proc/self/fd")? {
            // Descriptors can close between listing and reading the link.
            let Ok(target) = std::fs::read_link(entry?.path()) else {
                continue;
            };

            if descriptor_paths.contains(&target) {
                open_descriptors += 1;
            }
        }

        Ok(open_descriptors)
    }

    /// Where a removable-storage path is stored on disk.
    pub fn file_path(&self, document_path: &str) -> PathBuf {
        self.state
            .root
            .join(document_path.trim_start_matches('/'))
    }

    fn record(&self, call: ProviderCall) {
        self.state
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }

    fn document_file_path(&self, document: &DocumentRef) -> std::io::Result<PathBuf> {
        let document_path = document.uri().strip_prefix(URI_PREFIX).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("foreign document: {document}"),
            )
        })?;

        Ok(self.file_path(document_path))
    }
}

impl DocumentProvider for DirectoryDocumentProvider {
    fn resolve_document(&self, path: &str, writable: bool) -> std::io::Result<DocumentRef> {
        self.record(ProviderCall::ResolveDocument { writable });

        if !writable && !self.file_path(path).is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such document: {path}"),
            ));
        }

        Ok(DocumentRef::new(format!("{URI_PREFIX}{path}")))
    }

    fn open_descriptor(
        &self,
        document: &DocumentRef,
        mode: DescriptorMode,
    ) -> std::io::Result<File> {
        self.record(ProviderCall::OpenDescriptor(mode));

        if !self.state.descriptors_available {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "provider does not expose file descriptors",
            ));
        }

        let file_path = self.document_file_path(document)?;

        let descriptor = match mode {
            DescriptorMode::Read => File::open(&file_path)?,
            DescriptorMode::ReadWrite => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&file_path)?,
        };

        let canonical_path = file_path.canonicalize()?;
        self.state
            .descriptor_paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(canonical_path);

        Ok(descriptor)
    }

    fn open_input_stream(&self, document: &DocumentRef) -> std::io::Result<Box<dyn Read + Send>> {
        self.record(ProviderCall::OpenInputStream);

        let file = File::open(self.document_file_path(document)?)?;
        Ok(Box::new(self.state.tracker.track(file)))
    }

    fn open_output_stream(
        &self,
        document: &DocumentRef,
    ) -> std::io::Result<Box<dyn Write + Send>> {
        self.record(ProviderCall::OpenOutputStream);

        let file = File::create(self.document_file_path(document)?)?;
        Ok(Box::new(self.state.tracker.track(file)))
    }
}
