//! In-memory and directory-backed stand-ins for the collaborators of a copy.

mod provider;
mod share;
mod tracker;

pub use provider::{DirectoryDocumentProvider, ProviderCall};
pub use share::InMemoryShareFile;
pub use tracker::{HandleTracker, Tracked};
