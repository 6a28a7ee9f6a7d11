use std::io::{Read, Write};

use tracing::trace;

use super::{read_chunk, TransferContext, BUFFER_SIZE};


/// Copies `input` into `output` in [`BUFFER_SIZE`] chunks until `input` reports end-of-data,
/// then flushes `output`.
///
/// Returns the number of bytes copied.
pub(crate) fn copy_stream_to_stream<R, W>(
    input: &mut R,
    output: &mut W,
    context: &TransferContext<'_>,
) -> std::io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut bytes_copied: u64 = 0;

    loop {
        context.checkpoint()?;

        let bytes_read = read_chunk(input, &mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        output.write_all(&buffer[..bytes_read])?;

        context.progress.add(bytes_read as u64);
        bytes_copied += bytes_read as u64;

        trace!(bytes_copied, "copied stream chunk of {bytes_read} bytes");
    }

    output.flush()?;

    Ok(bytes_copied)
}
