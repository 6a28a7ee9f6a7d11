//! Single-file copying between heterogeneous storage backends with byte-level progress reporting.
//!
//! A file can live on one of three backends (see [`BackendKind`]):
//! - the **local filesystem**,
//! - **removable storage** that is only reachable through a [`DocumentProvider`], or
//! - a **network share** (see [`NetworkShareFile`]).
//!
//! [`FileCopier::copy`] copies exactly one file between any two of them.
//! Each side is resolved to either a seekable, mappable [`FileChannel`] (local files)
//! or a buffered stream (everything else), and the pair of resolved handle kinds decides
//! which of the four [`TransferStrategy`] variants moves the data.
//!
//! Progress is published through a [`ProgressCounter`] that the caller owns and can poll
//! from another thread while the copy is running.
//!
//!
//! <br>
//!
//! # Feature flags
//! The following feature flags enable optional functionality:
//! - `dunce` (*enabled by default*): enables the optional [`dunce`](../dunce/index.html) support:
//!   local paths that appear in errors and logs have Windows' UNC prefixes stripped
//!   if they can be represented using the usual type of path (e.g. `\\?\C:\foo -> C:\foo`).
//!   This crate only has an effect when compiling for Windows targets.
//! - `fs-err` (*disabled by default*): enables the optional [`fs-err`](../fs_err/index.html) support,
//!   which produces more helpful error messages when opening local files fails.
//! - `miette` (*disabled by default*): derives `miette::Diagnostic` on all [error types](crate::error).
//!
//!
//! <br>
//!
//! # Examples
//!
//! Copying a local file while another thread watches the progress:
//! ```no_run
//! # use fs_transfer::error::CopyError;
//! # use fs_transfer::{FileCopier, Location, ProgressCounter, SourceFile, TargetFile};
//! # fn main() -> Result<(), CopyError> {
//! let source = SourceFile::new(Location::local("./source-file.bin"), 1024 * 1024);
//! let target = TargetFile::new(Location::local("./target-file.bin"));
//!
//! let progress = ProgressCounter::new();
//! let watcher_progress = progress.clone();
//!
//! let watcher = std::thread::spawn(move || {
//!     let snapshot = watcher_progress.snapshot();
//!     println!("{} of {} bytes copied", snapshot.bytes_finished, snapshot.bytes_total);
//! });
//!
//! let finished = FileCopier::new().copy(&source, &target, &progress)?;
//! println!(
//!     "Copied {} bytes using the {} strategy.",
//!     finished.bytes_copied,
//!     finished.strategy
//! );
//!
//! # let _ = watcher.join();
//! # Ok(())
//! # }
//! ```
//!
//! [`BackendKind`]: crate::location::BackendKind
//! [`DocumentProvider`]: crate::location::DocumentProvider
//! [`NetworkShareFile`]: crate::location::NetworkShareFile
//! [`FileChannel`]: crate::channel::FileChannel
//! [`TransferStrategy`]: crate::transfer::TransferStrategy

#![warn(missing_docs)]


pub mod cancellation;
pub mod channel;
mod copier;
pub mod error;
pub mod location;
mod macros;
pub mod progress;
mod resolve;
mod session;
pub mod transfer;

pub use cancellation::CancellationToken;
pub use copier::*;
pub use location::{Location, SourceFile, TargetFile};
pub use progress::{ProgressCounter, TransferProgress};
pub use transfer::{TransferStrategy, BUFFER_SIZE};
