use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::transfer::TransferStrategy;


/// An error that can occur when copying a file with [`FileCopier`][crate::FileCopier].
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum CopyError {
    /// No readable handle could be obtained for the source file.
    ///
    /// For removable storage this means that both the descriptor and the
    /// stream could not be opened. No transfer was attempted.
    ///
    /// The inner [`std::io::Error`] will likely describe the real cause of this error.
    #[error("unable to open source file: {location}")]
    SourceResolutionFailed {
        /// Human-readable path or URI of the source.
        location: String,

        /// Underlying IO error describing why the source could not be opened.
        #[source]
        error: std::io::Error,
    },

    /// No writable handle could be obtained for the destination file.
    ///
    /// The already opened source handle has been closed before this error was returned.
    ///
    /// The inner [`std::io::Error`] will likely describe the real cause of this error.
    #[error("unable to open destination file: {location}")]
    DestinationResolutionFailed {
        /// Human-readable path or URI of the destination.
        location: String,

        /// Underlying IO error describing why the destination could not be opened.
        #[source]
        error: std::io::Error,
    },

    /// Reading, writing or memory-mapping failed after both endpoints were opened.
    ///
    /// All handles have been closed before this error was returned.
    /// The destination may contain a partial copy.
    #[error("file transfer failed (strategy: {strategy})")]
    TransferFailed {
        /// The strategy that was executing when the failure happened.
        strategy: TransferStrategy,

        /// IO error describing the cause of the outer error.
        #[source]
        error: std::io::Error,
    },

    /// The copy was cancelled through its [`CancellationToken`][crate::CancellationToken].
    ///
    /// All handles have been closed before this error was returned.
    #[error("file transfer was cancelled after {bytes_transferred} bytes")]
    Cancelled {
        /// Number of bytes that had been transferred before the cancellation was noticed.
        bytes_transferred: u64,
    },
}


/// Identifies one of the handles a copy session opens.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum SessionHandle {
    /// The buffered stream reading from a removable or network-share source.
    InputStream,

    /// The channel reading from a local source file.
    InputChannel,

    /// The buffered stream writing to a removable or network-share destination.
    OutputStream,

    /// The channel writing to a local destination file.
    OutputChannel,
}

impl Display for SessionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SessionHandle::InputStream => write!(f, "input stream"),
            SessionHandle::InputChannel => write!(f, "input channel"),
            SessionHandle::OutputStream => write!(f, "output stream"),
            SessionHandle::OutputChannel => write!(f, "output channel"),
        }
    }
}


/// A handle could not be closed cleanly when a copy session was torn down.
///
/// These are never returned as the error of a copy. On success they are collected into
/// [`CopyFinished::cleanup_warnings`][crate::CopyFinished::cleanup_warnings],
/// and in every case they are logged as warnings.
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
#[error("unable to close {handle}")]
pub struct HandleCloseError {
    /// The handle that failed to close.
    pub handle: SessionHandle,

    /// Underlying IO error (usually from the final flush or sync).
    #[source]
    pub error: std::io::Error,
}
