use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use tracing::{debug, debug_span};

use crate::{
    cancellation::CancellationToken,
    error::{CopyError, HandleCloseError},
    location::{DocumentProvider, SourceFile, TargetFile},
    progress::ProgressCounter,
    session::TransferSession,
    transfer::{TransferContext, TransferStrategy},
};


/// Options that influence the [`FileCopier::copy_with_options`] method.
#[derive(Clone, Debug, Default)]
pub struct CopyOptions {
    /// If set, the copy stops (with [`CopyError::Cancelled`]) soon after the token is cancelled.
    ///
    /// Defaults to `None`.
    pub cancellation: Option<CancellationToken>,
}


/// Information about a successful copy.
#[derive(Debug)]
pub struct CopyFinished {
    /// Number of bytes copied to the destination.
    pub bytes_copied: u64,

    /// The strategy that was used to copy the file.
    pub strategy: TransferStrategy,

    /// Handles that could not be closed cleanly after the copy finished.
    ///
    /// The data was fully transferred (and, for streams, flushed) before these happened,
    /// so they do not fail the copy. They have already been logged.
    pub cleanup_warnings: Vec<HandleCloseError>,
}


/// Copies single files between local, removable and network-share storage.
///
/// A copier without a [`DocumentProvider`] can copy between local files and network shares;
/// removable locations fail to resolve with [`CopyError::SourceResolutionFailed`]
/// or [`CopyError::DestinationResolutionFailed`].
///
/// A copier is cheap to clone and can be shared between threads, each running its own copies.
#[derive(Clone, Default)]
pub struct FileCopier {
    document_provider: Option<Arc<dyn DocumentProvider>>,
}

impl FileCopier {
    /// Creates a copier without a document provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `provider` to resolve and open removable-storage locations.
    pub fn with_document_provider<P>(mut self, provider: P) -> Self
    where
        P: DocumentProvider + 'static,
    {
        self.document_provider = Some(Arc::new(provider));
        self
    }

    /// Uses an already shared `provider` to resolve and open removable-storage locations.
    pub fn with_shared_document_provider(mut self, provider: Arc<dyn DocumentProvider>) -> Self {
        self.document_provider = Some(provider);
        self
    }

    /// Copies `source` to `target`, publishing progress through `progress`.
    ///
    /// This blocks until the whole file has been transferred or an error occurs.
    /// See [`copy_with_options`][Self::copy_with_options] for details.
    pub fn copy(
        &self,
        source: &SourceFile,
        target: &TargetFile,
        progress: &ProgressCounter,
    ) -> Result<CopyFinished, CopyError> {
        self.copy_with_options(source, target, progress, &CopyOptions::default())
    }

    /// Copies `source` to `target`, publishing progress through `progress`.
    ///
    /// Both endpoints are resolved to handles first (see [`Location`][crate::Location]
    /// for how each backend is opened), then exactly one [`TransferStrategy`] moves the data.
    /// Before this returns, every handle that was opened is closed, whether the copy succeeded or not.
    ///
    /// `progress.bytes_total()` is set to the source size before anything is transferred,
    /// and `progress.bytes_finished()` grows by the number of bytes transferred.
    /// On success, it has grown by exactly the source size.
    ///
    /// ## Errors
    /// - [`CopyError::SourceResolutionFailed`] or [`CopyError::DestinationResolutionFailed`]
    ///   if an endpoint could not be opened,
    /// - [`CopyError::TransferFailed`] if reading, writing or mapping failed midway, and
    /// - [`CopyError::Cancelled`] if `options.cancellation` was cancelled.
    ///
    /// Nothing is retried internally.
    pub fn copy_with_options(
        &self,
        source: &SourceFile,
        target: &TargetFile,
        progress: &ProgressCounter,
        options: &CopyOptions,
    ) -> Result<CopyFinished, CopyError> {
        let _span = debug_span!(
            "copy",
            source = %source.location(),
            target = %target.location(),
            bytes_total = source.size()
        )
        .entered();

        progress.set_total(source.size());

        let mut session =
            TransferSession::open(source, target, self.document_provider.as_deref())?;
        let strategy = session.strategy();

        let context = TransferContext::new(
            source.size(),
            progress,
            options.cancellation.as_ref(),
        );

        let transfer_result = session.transfer(&context);
        let cleanup_warnings = session.close();

        let bytes_copied = transfer_result?;
        debug!(bytes_copied, %strategy, "copy finished");

        Ok(CopyFinished {
            bytes_copied,
            strategy,
            cleanup_warnings,
        })
    }
}

impl Debug for FileCopier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCopier")
            .field(
                "has_document_provider",
                &self.document_provider.is_some(),
            )
            .finish()
    }
}
