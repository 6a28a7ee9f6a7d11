//! Where a file lives: source and target descriptors and the collaborator traits
//! through which non-local backends are reached.

use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
    sync::Arc,
};

mod provider;
mod share;

pub use provider::*;
pub use share::*;


/// Classification of the storage a file lives on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BackendKind {
    /// The local filesystem.
    Local,

    /// Removable or USB-attached storage, reachable only through a [`DocumentProvider`].
    RemovableProvider,

    /// A network share (see [`NetworkShareFile`]).
    NetworkShare,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::RemovableProvider => write!(f, "removable"),
            BackendKind::NetworkShare => write!(f, "network share"),
        }
    }
}


/// The location of a file, tagged with the backend it lives on.
///
/// Each variant carries exactly what its backend needs to be opened.
#[derive(Clone, Debug)]
pub enum Location {
    /// A path on the local filesystem.
    Local(PathBuf),

    /// A path on removable storage, which has to be turned into a [`DocumentRef`]
    /// by a [`DocumentProvider`] before it can be opened.
    Removable(String),

    /// A file on a network share.
    NetworkShare(Arc<dyn NetworkShareFile>),
}

impl Location {
    /// Creates a [`Location::Local`] from the given path.
    pub fn local<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::Local(path.into())
    }

    /// Creates a [`Location::Removable`] from the given provider-side path.
    pub fn removable<S>(path: S) -> Self
    where
        S: Into<String>,
    {
        Self::Removable(path.into())
    }

    /// Creates a [`Location::NetworkShare`] from the given share file.
    pub fn network_share<F>(file: F) -> Self
    where
        F: NetworkShareFile + 'static,
    {
        Self::NetworkShare(Arc::new(file))
    }

    /// Returns the backend this location lives on.
    pub fn backend_kind(&self) -> BackendKind {
        match self {
            Location::Local(_) => BackendKind::Local,
            Location::Removable(_) => BackendKind::RemovableProvider,
            Location::NetworkShare(_) => BackendKind::NetworkShare,
        }
    }

    /// Returns a human-readable path or URI, used in errors and logs.
    pub fn display_path(&self) -> String {
        match self {
            Location::Local(path) => simplified(path).display().to_string(),
            Location::Removable(path) => path.clone(),
            Location::NetworkShare(file) => file.path().to_string(),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_path(), self.backend_kind())
    }
}

#[cfg(feature = "dunce")]
fn simplified(path: &Path) -> &Path {
    dunce::simplified(path)
}

#[cfg(not(feature = "dunce"))]
fn simplified(path: &Path) -> &Path {
    path
}


/// The file to read from.
///
/// The size must be known up front: the mapped transfer strategies
/// size their memory mappings with it, and watchers use it as the progress total.
#[derive(Clone, Debug)]
pub struct SourceFile {
    location: Location,
    size: u64,
}

impl SourceFile {
    /// Describes a source file at `location` that is `size` bytes long.
    ///
    /// `size` must match the actual length of the file. Mapped transfers only cover
    /// `[0, size)`: a local source read into a stream is cut off at `size`, while a local
    /// source copied to a local destination is copied whole and the progress counter
    /// may then end above `size`. Use [`from_local_path`][Self::from_local_path]
    /// for local files to read the size from the filesystem.
    pub fn new(location: Location, size: u64) -> Self {
        Self { location, size }
    }

    /// Describes a local source file, reading its size from the filesystem.
    pub fn from_local_path<P>(path: P) -> std::io::Result<Self>
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        let size = path.metadata()?.len();

        Ok(Self::new(Location::Local(path), size))
    }

    /// Where the source file lives.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Size of the source file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}


/// The file to write to.
///
/// Local destinations are created if missing and truncated if they exist.
#[derive(Clone, Debug)]
pub struct TargetFile {
    location: Location,
}

impl TargetFile {
    /// Describes a destination file at `location`.
    pub fn new(location: Location) -> Self {
        Self { location }
    }

    /// Where the destination file lives.
    pub fn location(&self) -> &Location {
        &self.location
    }
}
