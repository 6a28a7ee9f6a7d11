//! Cooperative cancellation of a running copy.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use thiserror::Error;


/// A flag that can be raised from any thread to stop a running copy.
///
/// Transfers check the token between chunks, so a copy stops at most one
/// chunk ([`BUFFER_SIZE`][crate::BUFFER_SIZE] bytes) after [`cancel`][Self::cancel] is called.
/// The copy then fails with [`CopyError::Cancelled`][crate::error::CopyError::Cancelled].
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every copy this token (or one of its clones) was given to.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`][Self::cancel] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns a [`TransferCancelled`] IO error if cancellation was requested.
    pub(crate) fn checkpoint(&self) -> std::io::Result<()> {
        if self.is_cancelled() {
            return Err(std::io::Error::other(TransferCancelled));
        }

        Ok(())
    }
}


/// Marker carried inside an [`std::io::Error`] when a transfer stops because of a
/// [`CancellationToken`].
///
/// Transfers only speak [`std::io::Result`], so cancellation travels through them as an
/// IO error and is turned back into [`CopyError::Cancelled`][crate::error::CopyError::Cancelled]
/// by the session.
#[derive(Error, Debug)]
#[error("transfer was cancelled")]
pub(crate) struct TransferCancelled;

impl TransferCancelled {
    pub(crate) fn is_cause_of(error: &std::io::Error) -> bool {
        error
            .get_ref()
            .map(|inner| inner.is::<TransferCancelled>())
            .unwrap_or(false)
    }
}
