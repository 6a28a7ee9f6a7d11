//! Error types returned by [`FileCopier`][crate::FileCopier].
//!
//! Failures are split by the phase they happen in:
//! - resolution (no handle could be obtained for one of the endpoints),
//! - transfer (a read, write or mapping failed after both handles were open), and
//! - cleanup (a handle could not be closed cleanly).
//!
//! Cleanup failures never fail a copy on their own; they are logged and handed back
//! as [`HandleCloseError`]s in [`CopyFinished::cleanup_warnings`][crate::CopyFinished::cleanup_warnings].

mod copy;

pub use copy::*;
