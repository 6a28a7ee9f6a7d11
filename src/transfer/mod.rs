//! The four transfer algorithms and the table that picks one of them.
//!
//! Which algorithm runs depends only on the kinds of the two resolved handles:
//!
//! | Input handle | Output handle | Strategy |
//! |---|---|---|
//! | stream | stream | [`TransferStrategy::StreamToStream`] |
//! | stream | channel | [`TransferStrategy::StreamToMapped`] |
//! | channel | stream | [`TransferStrategy::MappedToStream`] |
//! | channel | channel | [`TransferStrategy::ChannelToChannel`] |
//!
//! All buffered paths move data in chunks of [`BUFFER_SIZE`] bytes
//! and advance the progress counter by the size of each chunk once it has been written.

use std::fmt::{self, Display, Formatter};

mod channel;
mod mapped;
mod stream;

pub(crate) use channel::copy_channel_to_channel;
pub(crate) use mapped::{copy_mapped_to_stream, copy_stream_to_mapped};
pub(crate) use stream::copy_stream_to_stream;

use crate::{cancellation::CancellationToken, progress::ProgressCounter};


/// Chunk size used by every buffered transfer path (8 KiB).
///
/// Also used as the capacity of the buffered streams opened for
/// removable and network-share endpoints.
pub const BUFFER_SIZE: usize = 8192;


/// Kind of handle an endpoint was resolved to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum HandleKind {
    /// A sequential, buffered stream (removable storage and network shares).
    Stream,

    /// A seekable, mappable channel over a local file.
    Channel,
}


/// The algorithm used to move bytes from the source to the destination.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TransferStrategy {
    /// Chunked reads from the input stream, each chunk written to the output stream.
    StreamToStream,

    /// Chunked reads from the input stream, copied sequentially into
    /// a read-write memory mapping of the destination.
    StreamToMapped,

    /// A read-only memory mapping of the source, drained chunk by chunk into the output stream.
    MappedToStream,

    /// A bulk transfer from the source channel into the destination channel,
    /// observed by a [`ProgressObservingChannel`][crate::channel::ProgressObservingChannel].
    ChannelToChannel,
}

impl TransferStrategy {
    /// Picks the strategy for a pair of resolved handle kinds.
    pub fn select(input: HandleKind, output: HandleKind) -> Self {
        match (input, output) {
            (HandleKind::Stream, HandleKind::Stream) => Self::StreamToStream,
            (HandleKind::Stream, HandleKind::Channel) => Self::StreamToMapped,
            (HandleKind::Channel, HandleKind::Stream) => Self::MappedToStream,
            (HandleKind::Channel, HandleKind::Channel) => Self::ChannelToChannel,
        }
    }
}

impl Display for TransferStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransferStrategy::StreamToStream => write!(f, "stream-to-stream"),
            TransferStrategy::StreamToMapped => write!(f, "stream-to-mapped"),
            TransferStrategy::MappedToStream => write!(f, "mapped-to-stream"),
            TransferStrategy::ChannelToChannel => write!(f, "channel-to-channel"),
        }
    }
}


/// Per-session state shared by all transfer algorithms.
pub(crate) struct TransferContext<'a> {
    /// Declared size of the source file.
    pub(crate) bytes_total: u64,

    pub(crate) progress: &'a ProgressCounter,

    pub(crate) cancellation: Option<&'a CancellationToken>,
}

impl<'a> TransferContext<'a> {
    pub(crate) fn new(
        bytes_total: u64,
        progress: &'a ProgressCounter,
        cancellation: Option<&'a CancellationToken>,
    ) -> Self {
        Self {
            bytes_total,
            progress,
            cancellation,
        }
    }

    /// Called between chunks; fails if the copy has been cancelled.
    pub(crate) fn checkpoint(&self) -> std::io::Result<()> {
        match self.cancellation {
            Some(token) => token.checkpoint(),
            None => Ok(()),
        }
    }
}


/// Reads once into `buffer`, retrying reads that were interrupted by a signal.
fn read_chunk<R>(input: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: std::io::Read + ?Sized,
{
    loop {
        match input.read(buffer) {
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}




#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_is_picked_by_handle_kinds_alone() {
        assert_eq!(
            TransferStrategy::select(HandleKind::Stream, HandleKind::Stream),
            TransferStrategy::StreamToStream
        );
        assert_eq!(
            TransferStrategy::select(HandleKind::Stream, HandleKind::Channel),
            TransferStrategy::StreamToMapped
        );
        assert_eq!(
            TransferStrategy::select(HandleKind::Channel, HandleKind::Stream),
            TransferStrategy::MappedToStream
        );
        assert_eq!(
            TransferStrategy::select(HandleKind::Channel, HandleKind::Channel),
            TransferStrategy::ChannelToChannel
        );
    }

    #[test]
    fn read_chunk_retries_interrupted_reads() {
        struct InterruptOnce(bool);

        impl std::io::Read for InterruptOnce {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if !self.0 {
                    self.0 = true;
                    return Err(std::io::ErrorKind::Interrupted.into());
                }

                buf[0] = 1;
                Ok(1)
            }
        }

        let mut buffer = [0u8; 4];
        assert_eq!(
            read_chunk(&mut InterruptOnce(false), &mut buffer).unwrap(),
            1
        );
    }
}
