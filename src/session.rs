use tracing::{debug, error, warn};

use crate::{
    cancellation::TransferCancelled,
    error::{CopyError, HandleCloseError},
    location::{DocumentProvider, SourceFile, TargetFile},
    resolve::{resolve_input, resolve_output, InputHandle, OutputHandle},
    transfer::{
        copy_channel_to_channel,
        copy_mapped_to_stream,
        copy_stream_to_mapped,
        copy_stream_to_stream,
        TransferContext,
        TransferStrategy,
    },
};


/// Everything one copy holds open: the resolved handles and the strategy picked for them.
///
/// A session is consumed by [`close`][TransferSession::close], which releases every handle.
pub(crate) struct TransferSession {
    input: InputHandle,
    output: OutputHandle,
    strategy: TransferStrategy,
}

impl TransferSession {
    /// Resolves both endpoints and picks the transfer strategy.
    ///
    /// If the destination cannot be resolved, the already opened source handle
    /// is closed before the error is returned.
    pub(crate) fn open(
        source: &SourceFile,
        target: &TargetFile,
        document_provider: Option<&dyn DocumentProvider>,
    ) -> Result<Self, CopyError> {
        let input = resolve_input(source, document_provider)?;

        let output = match resolve_output(target, document_provider) {
            Ok(output) => output,
            Err(resolution_error) => {
                if let Err(close_error) = input.close() {
                    log_close_error(&close_error);
                }

                return Err(resolution_error);
            }
        };

        let strategy = TransferStrategy::select(input.kind(), output.kind());
        debug!(%strategy, "selected transfer strategy");

        Ok(Self {
            input,
            output,
            strategy,
        })
    }

    pub(crate) fn strategy(&self) -> TransferStrategy {
        self.strategy
    }

    /// Runs the selected strategy once.
    ///
    /// Returns the number of bytes copied.
    pub(crate) fn transfer(&mut self, context: &TransferContext<'_>) -> Result<u64, CopyError> {
        let bytes_finished_before = context.progress.bytes_finished();

        let transfer_result = match (&mut self.input, &mut self.output) {
            (InputHandle::Stream { reader, .. }, OutputHandle::Stream { writer, .. }) => {
                copy_stream_to_stream(reader, writer, context)
            }
            (InputHandle::Stream { reader, .. }, OutputHandle::Channel(output_channel)) => {
                copy_stream_to_mapped(reader, output_channel, context)
            }
            (InputHandle::Channel(input_channel), OutputHandle::Stream { writer, .. }) => {
                copy_mapped_to_stream(input_channel, writer, context)
            }
            (InputHandle::Channel(input_channel), OutputHandle::Channel(output_channel)) => {
                copy_channel_to_channel(input_channel, output_channel, context)
            }
        };

        transfer_result.map_err(|error| {
            if TransferCancelled::is_cause_of(&error) {
                let bytes_transferred = context
                    .progress
                    .bytes_finished()
                    .saturating_sub(bytes_finished_before);

                debug!(bytes_transferred, "transfer cancelled");
                return CopyError::Cancelled { bytes_transferred };
            }

            error!(strategy = %self.strategy, %error, "transfer failed");

            CopyError::TransferFailed {
                strategy: self.strategy,
                error,
            }
        })
    }

    /// Closes every handle, output first.
    ///
    /// A handle that fails to close does not stop the others from being closed.
    /// Failures are logged and returned.
    pub(crate) fn close(self) -> Vec<HandleCloseError> {
        let close_results = [self.output.close(), self.input.close()];

        close_results
            .into_iter()
            .filter_map(Result::err)
            .inspect(log_close_error)
            .collect()
    }
}


fn log_close_error(close_error: &HandleCloseError) {
    warn!(
        handle = %close_error.handle,
        error = %close_error.error,
        "failed to close handle"
    );
}
