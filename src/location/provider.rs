use std::{
    fmt::{self, Display, Formatter},
    fs::File,
    io::{Read, Write},
};


/// A reference to a document on removable storage, as handed out by a [`DocumentProvider`].
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct DocumentRef {
    uri: String,
}

impl DocumentRef {
    /// Wraps a provider-specific document URI.
    pub fn new<S>(uri: S) -> Self
    where
        S: Into<String>,
    {
        Self { uri: uri.into() }
    }

    /// The provider-specific URI identifying this document.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Display for DocumentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}


/// Access mode requested when opening a raw descriptor through a [`DocumentProvider`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum DescriptorMode {
    /// Read-only access (`"r"`).
    Read,

    /// Read-write access (`"rw"`).
    ReadWrite,
}

impl DescriptorMode {
    /// The mode string most content-resolution services expect (`"r"` or `"rw"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorMode::Read => "r",
            DescriptorMode::ReadWrite => "rw",
        }
    }
}


/// Platform service that resolves removable-storage paths into documents
/// and opens them.
///
/// Opening a raw descriptor is preferred; providers that cannot expose one
/// should return an error from [`open_descriptor`][DocumentProvider::open_descriptor],
/// in which case the stream-opening methods are used instead.
pub trait DocumentProvider: Send + Sync {
    /// Resolves a removable-storage path into a document reference.
    ///
    /// `writable` is `true` when the document is about to be written to,
    /// allowing the provider to create it if it does not exist.
    fn resolve_document(&self, path: &str, writable: bool) -> std::io::Result<DocumentRef>;

    /// Opens a raw file descriptor for the document.
    fn open_descriptor(
        &self,
        document: &DocumentRef,
        mode: DescriptorMode,
    ) -> std::io::Result<File>;

    /// Opens a readable stream over the document's content.
    fn open_input_stream(&self, document: &DocumentRef) -> std::io::Result<Box<dyn Read + Send>>;

    /// Opens a writable stream that replaces the document's content.
    fn open_output_stream(
        &self,
        document: &DocumentRef,
    ) -> std::io::Result<Box<dyn Write + Send>>;
}
