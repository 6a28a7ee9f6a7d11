//! Seekable, mappable channels over local files, and the progress-observing adapter
//! used when copying between two of them.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use memmap2::{Mmap, MmapMut, MmapOptions};

mod observed;

pub use observed::ProgressObservingChannel;

use crate::macros::use_local_fs_module;


/// A readable channel that can report whether it is still open and be closed explicitly.
pub trait ReadableChannel: Read {
    /// Returns `true` until [`close`][ReadableChannel::close] has been called.
    fn is_open(&self) -> bool;

    /// Closes the channel. Closing an already closed channel does nothing.
    fn close(&mut self) -> std::io::Result<()>;
}

impl<C> ReadableChannel for &mut C
where
    C: ReadableChannel + ?Sized,
{
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) -> std::io::Result<()> {
        (**self).close()
    }
}


/// A channel over a local file.
///
/// Unlike buffered streams, a channel can be memory-mapped and used as the
/// destination of a bulk [`transfer_from`][FileChannel::transfer_from].
#[derive(Debug)]
pub struct FileChannel {
    file: Option<File>,
    path: PathBuf,
    writable: bool,
}

impl FileChannel {
    /// Opens the file at `path` for reading.
    pub fn open_read<P>(path: P) -> std::io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = open_local_file(path, false)?;

        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            writable: false,
        })
    }

    /// Opens the file at `path` for reading and writing.
    ///
    /// The file is created if it does not exist and truncated if it does.
    pub fn open_read_write<P>(path: P) -> std::io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = open_local_file(path, true)?;

        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            writable: true,
        })
    }

    /// Path this channel was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the underlying file in bytes.
    pub fn size(&self) -> std::io::Result<u64> {
        Ok(self.file()?.metadata()?.len())
    }

    /// Truncates or extends the underlying file to `len` bytes.
    pub fn set_len(&self, len: u64) -> std::io::Result<()> {
        self.file()?.set_len(len)
    }

    /// Maps the region `[0, len)` of the file read-only.
    ///
    /// The file must be at least `len` bytes long.
    pub fn map_read_only(&self, len: u64) -> std::io::Result<Mmap> {
        let len = mapping_length(len)?;
        let file = self.file()?;

        // SAFETY: the mapping is only read while this session holds the file open.
        // Concurrent truncation of the file by another process is outside our control,
        // which is the usual caveat of memory-mapped IO.
        unsafe { MmapOptions::new().len(len).map(file) }
    }

    /// Maps the region `[0, len)` of the file read-write, growing the file to `len` bytes first.
    pub fn map_read_write(&mut self, len: u64) -> std::io::Result<MmapMut> {
        if !self.writable {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "channel was opened read-only",
            ));
        }

        let mapped_len = mapping_length(len)?;
        let file = self.file()?;

        if file.metadata()?.len() < len {
            file.set_len(len)?;
        }

        // SAFETY: see `map_read_only`; the file was opened read-write above.
        unsafe { MmapOptions::new().len(mapped_len).map_mut(file) }
    }

    /// Writes everything `source` yields into this channel, starting at `position`.
    ///
    /// At most `count` bytes are transferred; the transfer stops earlier as soon as
    /// `source` reports end-of-data by returning `0` from a read.
    /// Returns the number of bytes transferred.
    pub fn transfer_from<R>(
        &mut self,
        source: &mut R,
        position: u64,
        count: u64,
    ) -> std::io::Result<u64>
    where
        R: Read + ?Sized,
    {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(position))?;

        let mut limited_source = source.take(count);
        std::io::copy(&mut limited_source, file)
    }

    fn file(&self) -> std::io::Result<&File> {
        self.file.as_ref().ok_or_else(closed_channel_error)
    }

    fn file_mut(&mut self) -> std::io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed_channel_error)
    }
}

impl Read for FileChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file_mut()?.read(buf)
    }
}

impl Write for FileChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl ReadableChannel for FileChannel {
    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Closes the channel.
    ///
    /// Writable channels are synced to disk first, so that deferred write errors
    /// (e.g. a full disk) surface here instead of being lost when the file is dropped.
    fn close(&mut self) -> std::io::Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };

        if self.writable {
            file.sync_data()?;
        }

        Ok(())
    }
}


fn open_local_file(path: &Path, writable: bool) -> std::io::Result<File> {
    use_local_fs_module!();

    let mut options = fs::OpenOptions::new();
    options.read(true);

    if writable {
        options.write(true).create(true).truncate(true);
    }

    let file = options.open(path)?;

    #[cfg(feature = "fs-err")]
    let file = file.into_parts().0;

    Ok(file)
}

fn mapping_length(len: u64) -> std::io::Result<usize> {
    usize::try_from(len).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "file is too large to be memory-mapped on this platform",
        )
    })
}

fn closed_channel_error() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "channel is closed")
}
