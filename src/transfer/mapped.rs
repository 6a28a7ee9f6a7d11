use std::io::{Read, Write};

use tracing::{trace, warn};

use super::{read_chunk, TransferContext, BUFFER_SIZE};
use crate::channel::FileChannel;


/// Copies `input` into a read-write memory mapping of `output` covering
/// `[0, context.bytes_total)`.
///
/// If the stream ends early, the destination is truncated to the bytes actually received.
/// If the stream yields more than `context.bytes_total` bytes, the transfer fails
/// with [`InvalidData`][std::io::ErrorKind::InvalidData], since the mapping cannot grow.
///
/// Returns the number of bytes copied.
pub(crate) fn copy_stream_to_mapped<R>(
    input: &mut R,
    output: &mut FileChannel,
    context: &TransferContext<'_>,
) -> std::io::Result<u64>
where
    R: Read + ?Sized,
{
    let mut buffer = vec![0u8; BUFFER_SIZE];

    if context.bytes_total == 0 {
        context.checkpoint()?;

        if read_chunk(input, &mut buffer)? > 0 {
            return Err(stream_longer_than_declared(context.bytes_total));
        }

        return Ok(0);
    }

    let mut mapping = output.map_read_write(context.bytes_total)?;
    let mut position: usize = 0;

    loop {
        context.checkpoint()?;

        let bytes_read = read_chunk(input, &mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        let Some(region) = mapping.get_mut(position..position + bytes_read) else {
            return Err(stream_longer_than_declared(context.bytes_total));
        };

        region.copy_from_slice(&buffer[..bytes_read]);
        position += bytes_read;

        context.progress.add(bytes_read as u64);

        trace!(position, "mapped stream chunk of {bytes_read} bytes");
    }

    mapping.flush()?;
    drop(mapping);

    let bytes_copied = position as u64;

    if bytes_copied < context.bytes_total {
        warn!(
            bytes_copied,
            bytes_expected = context.bytes_total,
            "source stream ended early, truncating destination"
        );

        output.set_len(bytes_copied)?;
    }

    Ok(bytes_copied)
}


/// Maps `[0, context.bytes_total)` of `input` read-only and drains it into `output`
/// in [`BUFFER_SIZE`] chunks, then flushes `output`.
///
/// Fails with [`UnexpectedEof`][std::io::ErrorKind::UnexpectedEof] if the source file
/// is shorter than its declared size.
///
/// Returns the number of bytes copied.
pub(crate) fn copy_mapped_to_stream<W>(
    input: &FileChannel,
    output: &mut W,
    context: &TransferContext<'_>,
) -> std::io::Result<u64>
where
    W: Write + ?Sized,
{
    if context.bytes_total == 0 {
        output.flush()?;
        return Ok(0);
    }

    let available_bytes = input.size()?;
    if available_bytes < context.bytes_total {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "source file has {} bytes, but {} were expected",
                available_bytes, context.bytes_total
            ),
        ));
    }

    let mapping = input.map_read_only(context.bytes_total)?;
    let mut bytes_copied: u64 = 0;

    for chunk in mapping.chunks(BUFFER_SIZE) {
        context.checkpoint()?;

        output.write_all(chunk)?;

        context.progress.add(chunk.len() as u64);
        bytes_copied += chunk.len() as u64;

        trace!(bytes_copied, "drained mapped chunk of {} bytes", chunk.len());
    }

    output.flush()?;

    Ok(bytes_copied)
}


fn stream_longer_than_declared(bytes_total: u64) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("source stream is longer than its declared size of {bytes_total} bytes"),
    )
}
