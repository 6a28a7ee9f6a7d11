use std::io::Read;

use super::ReadableChannel;
use crate::{cancellation::CancellationToken, progress::ProgressCounter};


/// Wraps a [`ReadableChannel`] and advances a [`ProgressCounter`] by every byte read through it.
///
/// This is what makes progress visible on the channel-to-channel path,
/// where the bulk transfer never hands its buffers back to us.
///
/// Reads behave as follows:
/// - a positive byte count from the delegate is added to the counter and returned,
/// - `0` from the delegate is returned as `0` without touching the counter,
/// - a [`WouldBlock`][std::io::ErrorKind::WouldBlock] error ("no data right now") is reported as `0`
///   without touching the counter, and
/// - any other error is passed through unchanged.
#[derive(Debug)]
pub struct ProgressObservingChannel<C>
where
    C: ReadableChannel,
{
    delegate: C,
    progress: ProgressCounter,
    cancellation: Option<CancellationToken>,
}

impl<C> ProgressObservingChannel<C>
where
    C: ReadableChannel,
{
    /// Wraps `delegate`, reporting every byte read into `progress`.
    pub fn new(delegate: C, progress: ProgressCounter) -> Self {
        Self {
            delegate,
            progress,
            cancellation: None,
        }
    }

    /// Makes reads fail once `token` has been cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Unwraps the delegate.
    pub fn into_inner(self) -> C {
        self.delegate
    }
}

impl<C> Read for ProgressObservingChannel<C>
where
    C: ReadableChannel,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if let Some(token) = &self.cancellation {
            token.checkpoint()?;
        }

        match self.delegate.read(buf) {
            Ok(0) => Ok(0),
            Ok(bytes_read) => {
                self.progress.add(bytes_read as u64);
                Ok(bytes_read)
            }
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(error) => Err(error),
        }
    }
}

impl<C> ReadableChannel for ProgressObservingChannel<C>
where
    C: ReadableChannel,
{
    fn is_open(&self) -> bool {
        self.delegate.is_open()
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.delegate.close()
    }
}
