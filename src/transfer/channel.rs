use tracing::trace;

use super::TransferContext;
use crate::channel::{FileChannel, ProgressObservingChannel};


/// Bulk-transfers `input` into `output` starting at offset zero.
///
/// The input is wrapped in a [`ProgressObservingChannel`], which is the only place
/// progress is reported on this path. The transfer asks for `u64::MAX` bytes
/// and ends at the source's end-of-data.
///
/// Returns the number of bytes copied.
pub(crate) fn copy_channel_to_channel(
    input: &mut FileChannel,
    output: &mut FileChannel,
    context: &TransferContext<'_>,
) -> std::io::Result<u64> {
    let mut observed_input = ProgressObservingChannel::new(input, context.progress.clone());

    if let Some(token) = context.cancellation {
        observed_input = observed_input.with_cancellation(token.clone());
    }

    let bytes_copied = output.transfer_from(&mut observed_input, 0, u64::MAX)?;
    trace!(bytes_copied, "channel transfer finished");

    Ok(bytes_copied)
}


#[cfg(test)]
mod tests {
    use assert_fs::{prelude::*, TempDir};

    use super::*;
    use crate::{
        cancellation::{CancellationToken, TransferCancelled},
        channel::ReadableChannel,
        progress::ProgressCounter,
        transfer::test_support::patterned_data,
    };

    #[test]
    fn channel_transfer_copies_everything_and_reports_progress() {
        let temporary_directory = TempDir::new().unwrap();
        let source = temporary_directory.child("source.bin");
        let destination = temporary_directory.child("destination.bin");

        let data = patterned_data(100_000);
        source.write_binary(&data).unwrap();

        let progress = ProgressCounter::new();
        let context = TransferContext::new(100_000, &progress, None);

        let mut input = FileChannel::open_read(source.path()).unwrap();
        let mut output = FileChannel::open_read_write(destination.path()).unwrap();

        let bytes_copied = copy_channel_to_channel(&mut input, &mut output, &context).unwrap();

        // The adapter only borrowed the input, it is still ours to close.
        assert!(input.is_open());
        input.close().unwrap();
        output.close().unwrap();

        assert_eq!(bytes_copied, 100_000);
        assert_eq!(progress.bytes_finished(), 100_000);
        assert_eq!(std::fs::read(destination.path()).unwrap(), data);
    }

    #[test]
    fn cancelled_channel_transfer_fails() {
        let temporary_directory = TempDir::new().unwrap();
        let source = temporary_directory.child("source.bin");
        let destination = temporary_directory.child("destination.bin");
        source.write_binary(&patterned_data(1000)).unwrap();

        let progress = ProgressCounter::new();
        let token = CancellationToken::new();
        token.cancel();
        let context = TransferContext::new(1000, &progress, Some(&token));

        let mut input = FileChannel::open_read(source.path()).unwrap();
        let mut output = FileChannel::open_read_write(destination.path()).unwrap();

        let error = copy_channel_to_channel(&mut input, &mut output, &context).unwrap_err();

        assert!(TransferCancelled::is_cause_of(&error));
        assert_eq!(progress.bytes_finished(), 0);
    }
}
