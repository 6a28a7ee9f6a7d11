//! Turns source and target descriptors into open handles.
//!
//! Local files become [`FileChannel`]s. Removable and network-share files become
//! buffered streams, because content providers and network shares do not reliably
//! expose raw file descriptors that could be mapped.

use std::{
    fmt::{self, Debug, Formatter},
    io::{BufReader, BufWriter, Read, Write},
};

use tracing::debug;

use crate::{
    channel::{FileChannel, ReadableChannel},
    error::{CopyError, HandleCloseError, SessionHandle},
    location::{DescriptorMode, DocumentProvider, Location, SourceFile, TargetFile},
    transfer::{HandleKind, BUFFER_SIZE},
};


/// How a stream handle was obtained.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum StreamOrigin {
    /// A raw descriptor opened through the document provider.
    Descriptor,

    /// The document provider's stream-opening call (the fallback when no descriptor is available).
    ProviderStream,

    /// The network share's native stream.
    NetworkShare,
}


pub(crate) enum InputHandle {
    Stream {
        reader: BufReader<Box<dyn Read + Send>>,
        origin: StreamOrigin,
    },
    Channel(FileChannel),
}

impl Debug for InputHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InputHandle::Stream { origin, .. } => f
                .debug_struct("InputHandle::Stream")
                .field("origin", origin)
                .finish_non_exhaustive(),
            InputHandle::Channel(channel) => f
                .debug_tuple("InputHandle::Channel")
                .field(channel)
                .finish(),
        }
    }
}

impl InputHandle {
    pub(crate) fn kind(&self) -> HandleKind {
        match self {
            InputHandle::Stream { .. } => HandleKind::Stream,
            InputHandle::Channel(_) => HandleKind::Channel,
        }
    }

    /// Closes the handle, consuming it so it cannot be closed twice.
    pub(crate) fn close(self) -> Result<(), HandleCloseError> {
        match self {
            InputHandle::Stream { reader, .. } => {
                drop(reader);
                Ok(())
            }
            InputHandle::Channel(mut channel) => {
                channel.close().map_err(|error| HandleCloseError {
                    handle: SessionHandle::InputChannel,
                    error,
                })
            }
        }
    }
}


pub(crate) enum OutputHandle {
    Stream {
        writer: BufWriter<Box<dyn Write + Send>>,
        origin: StreamOrigin,
    },
    Channel(FileChannel),
}

impl Debug for OutputHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OutputHandle::Stream { origin, .. } => f
                .debug_struct("OutputHandle::Stream")
                .field("origin", origin)
                .finish_non_exhaustive(),
            OutputHandle::Channel(channel) => f
                .debug_tuple("OutputHandle::Channel")
                .field(channel)
                .finish(),
        }
    }
}

impl OutputHandle {
    pub(crate) fn kind(&self) -> HandleKind {
        match self {
            OutputHandle::Stream { .. } => HandleKind::Stream,
            OutputHandle::Channel(_) => HandleKind::Channel,
        }
    }

    /// Closes the handle, consuming it so it cannot be closed twice.
    ///
    /// Streams are flushed (buffer first, then the underlying stream) before being dropped.
    pub(crate) fn close(self) -> Result<(), HandleCloseError> {
        match self {
            OutputHandle::Stream { writer, .. } => {
                let mut inner_writer = writer.into_inner().map_err(|error| HandleCloseError {
                    handle: SessionHandle::OutputStream,
                    error: error.into_error(),
                })?;

                inner_writer.flush().map_err(|error| HandleCloseError {
                    handle: SessionHandle::OutputStream,
                    error,
                })
            }
            OutputHandle::Channel(mut channel) => {
                channel.close().map_err(|error| HandleCloseError {
                    handle: SessionHandle::OutputChannel,
                    error,
                })
            }
        }
    }
}


/// Opens a readable handle for `source`.
///
/// - Removable: descriptor first, provider stream as the fallback, both buffered.
/// - Network share: the share's input stream, buffered.
/// - Local: a read-only channel.
pub(crate) fn resolve_input(
    source: &SourceFile,
    document_provider: Option<&dyn DocumentProvider>,
) -> Result<InputHandle, CopyError> {
    let location = source.location();

    let resolution_error = |error: std::io::Error| CopyError::SourceResolutionFailed {
        location: location.display_path(),
        error,
    };

    let handle = match location {
        Location::Removable(path) => {
            let provider = require_provider(document_provider).map_err(resolution_error)?;
            let (stream, origin) =
                open_removable_input(provider, path).map_err(resolution_error)?;

            InputHandle::Stream {
                reader: BufReader::with_capacity(BUFFER_SIZE, stream),
                origin,
            }
        }
        Location::NetworkShare(file) => {
            let stream = file.open_input_stream().map_err(resolution_error)?;

            InputHandle::Stream {
                reader: BufReader::with_capacity(BUFFER_SIZE, stream),
                origin: StreamOrigin::NetworkShare,
            }
        }
        Location::Local(path) => {
            InputHandle::Channel(FileChannel::open_read(path).map_err(resolution_error)?)
        }
    };

    debug!(
        source = %location,
        kind = ?handle.kind(),
        "resolved source handle"
    );

    Ok(handle)
}


/// Opens a writable handle for `target`.
///
/// - Removable: read-write descriptor first, provider output stream as the fallback, both buffered.
/// - Network share: the share's output stream, buffered.
/// - Local: a read-write channel (created if missing, truncated otherwise).
pub(crate) fn resolve_output(
    target: &TargetFile,
    document_provider: Option<&dyn DocumentProvider>,
) -> Result<OutputHandle, CopyError> {
    let location = target.location();

    let resolution_error = |error: std::io::Error| CopyError::DestinationResolutionFailed {
        location: location.display_path(),
        error,
    };

    let handle = match location {
        Location::Removable(path) => {
            let provider = require_provider(document_provider).map_err(resolution_error)?;
            let (stream, origin) =
                open_removable_output(provider, path).map_err(resolution_error)?;

            OutputHandle::Stream {
                writer: BufWriter::with_capacity(BUFFER_SIZE, stream),
                origin,
            }
        }
        Location::NetworkShare(file) => {
            let stream = file.open_output_stream().map_err(resolution_error)?;

            OutputHandle::Stream {
                writer: BufWriter::with_capacity(BUFFER_SIZE, stream),
                origin: StreamOrigin::NetworkShare,
            }
        }
        Location::Local(path) => {
            OutputHandle::Channel(FileChannel::open_read_write(path).map_err(resolution_error)?)
        }
    };

    debug!(
        target = %location,
        kind = ?handle.kind(),
        "resolved destination handle"
    );

    Ok(handle)
}


fn require_provider(
    document_provider: Option<&dyn DocumentProvider>,
) -> std::io::Result<&dyn DocumentProvider> {
    document_provider.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "removable storage requires a document provider",
        )
    })
}

fn open_removable_input(
    provider: &dyn DocumentProvider,
    path: &str,
) -> std::io::Result<(Box<dyn Read + Send>, StreamOrigin)> {
    let document = provider.resolve_document(path, false)?;

    match provider.open_descriptor(&document, DescriptorMode::Read) {
        Ok(descriptor) => {
            let stream: Box<dyn Read + Send> = Box::new(descriptor);
            Ok((stream, StreamOrigin::Descriptor))
        }
        Err(error) => {
            debug!(
                document = %document,
                %error,
                "no readable descriptor, falling back to provider stream"
            );

            let stream = provider.open_input_stream(&document)?;
            Ok((stream, StreamOrigin::ProviderStream))
        }
    }
}

fn open_removable_output(
    provider: &dyn DocumentProvider,
    path: &str,
) -> std::io::Result<(Box<dyn Write + Send>, StreamOrigin)> {
    let document = provider.resolve_document(path, true)?;

    match provider.open_descriptor(&document, DescriptorMode::ReadWrite) {
        Ok(descriptor) => {
            let stream: Box<dyn Write + Send> = Box::new(descriptor);
            Ok((stream, StreamOrigin::Descriptor))
        }
        Err(error) => {
            debug!(
                document = %document,
                %error,
                "no writable descriptor, falling back to provider stream"
            );

            let stream = provider.open_output_stream(&document)?;
            Ok((stream, StreamOrigin::ProviderStream))
        }
    }
}


#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        io::Cursor,
        sync::{Arc, Mutex},
    };

    use assert_fs::{prelude::*, TempDir};
    use assert_matches::assert_matches;

    use super::*;
    use crate::location::{DocumentRef, NetworkShareFile};

    /// Serves every document from a single file and records what was asked of it.
    struct SingleFileProvider {
        file: std::path::PathBuf,
        descriptors_available: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl SingleFileProvider {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DocumentProvider for SingleFileProvider {
        fn resolve_document(&self, path: &str, _writable: bool) -> std::io::Result<DocumentRef> {
            self.calls.lock().unwrap().push("resolve");
            Ok(DocumentRef::new(format!("content://test{path}")))
        }

        fn open_descriptor(
            &self,
            _document: &DocumentRef,
            mode: DescriptorMode,
        ) -> std::io::Result<File> {
            self.calls.lock().unwrap().push("descriptor");

            if !self.descriptors_available {
                return Err(std::io::ErrorKind::NotFound.into());
            }

            match mode {
                DescriptorMode::Read => File::open(&self.file),
                DescriptorMode::ReadWrite => File::create(&self.file),
            }
        }

        fn open_input_stream(
            &self,
            _document: &DocumentRef,
        ) -> std::io::Result<Box<dyn Read + Send>> {
            self.calls.lock().unwrap().push("input stream");
            Ok(Box::new(File::open(&self.file)?))
        }

        fn open_output_stream(
            &self,
            _document: &DocumentRef,
        ) -> std::io::Result<Box<dyn Write + Send>> {
            self.calls.lock().unwrap().push("output stream");
            Ok(Box::new(File::create(&self.file)?))
        }
    }

    #[derive(Debug)]
    struct UnreachableShare;

    impl NetworkShareFile for UnreachableShare {
        fn path(&self) -> &str {
            "smb://nas/unreachable.bin"
        }

        fn open_input_stream(&self) -> std::io::Result<Box<dyn Read + Send>> {
            Err(std::io::ErrorKind::ConnectionRefused.into())
        }

        fn open_output_stream(&self) -> std::io::Result<Box<dyn Write + Send>> {
            Ok(Box::new(Cursor::new(Vec::new())))
        }
    }

    fn provider(temporary_directory: &TempDir, descriptors_available: bool) -> SingleFileProvider {
        let file = temporary_directory.child("document.bin");
        file.write_binary(b"document").unwrap();

        SingleFileProvider {
            file: file.path().to_path_buf(),
            descriptors_available,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn removable_source_prefers_a_descriptor() {
        let temporary_directory = TempDir::new().unwrap();
        let provider = provider(&temporary_directory, true);

        let source = SourceFile::new(Location::removable("/usb/document.bin"), 8);
        let handle = resolve_input(&source, Some(&provider)).unwrap();

        assert_matches!(
            handle,
            InputHandle::Stream {
                origin: StreamOrigin::Descriptor,
                ..
            }
        );
        assert_eq!(provider.calls(), vec!["resolve", "descriptor"]);
    }

    #[test]
    fn removable_source_falls_back_to_provider_stream() {
        let temporary_directory = TempDir::new().unwrap();
        let provider = provider(&temporary_directory, false);

        let source = SourceFile::new(Location::removable("/usb/document.bin"), 8);
        let handle = resolve_input(&source, Some(&provider)).unwrap();

        assert_eq!(handle.kind(), HandleKind::Stream);
        assert_matches!(
            handle,
            InputHandle::Stream {
                origin: StreamOrigin::ProviderStream,
                ..
            }
        );
        assert_eq!(
            provider.calls(),
            vec!["resolve", "descriptor", "input stream"]
        );
    }

    #[test]
    fn removable_target_falls_back_to_provider_stream() {
        let temporary_directory = TempDir::new().unwrap();
        let provider = provider(&temporary_directory, false);

        let target = TargetFile::new(Location::removable("/usb/document.bin"));
        let handle = resolve_output(&target, Some(&provider)).unwrap();

        assert_matches!(
            handle,
            OutputHandle::Stream {
                origin: StreamOrigin::ProviderStream,
                ..
            }
        );
        assert_eq!(
            provider.calls(),
            vec!["resolve", "descriptor", "output stream"]
        );
    }

    #[test]
    fn removable_source_without_provider_is_a_resolution_failure() {
        let source = SourceFile::new(Location::removable("/usb/document.bin"), 8);

        assert_matches!(
            resolve_input(&source, None),
            Err(CopyError::SourceResolutionFailed { location, error })
            if location == "/usb/document.bin" && error.kind() == std::io::ErrorKind::Unsupported
        );
    }

    #[test]
    fn unreachable_share_is_a_resolution_failure() {
        let source = SourceFile::new(Location::network_share(UnreachableShare), 8);

        assert_matches!(
            resolve_input(&source, None),
            Err(CopyError::SourceResolutionFailed { error, .. })
            if error.kind() == std::io::ErrorKind::ConnectionRefused
        );
    }

    #[test]
    fn local_endpoints_resolve_to_channels() {
        let temporary_directory = TempDir::new().unwrap();
        let source_file = temporary_directory.child("source.bin");
        source_file.write_binary(b"abc").unwrap();

        let source = SourceFile::from_local_path(source_file.path()).unwrap();
        let target = TargetFile::new(Location::local(
            temporary_directory.child("target.bin").path(),
        ));

        let input = resolve_input(&source, None).unwrap();
        let output = resolve_output(&target, None).unwrap();

        assert_eq!(input.kind(), HandleKind::Channel);
        assert_eq!(output.kind(), HandleKind::Channel);

        input.close().unwrap();
        output.close().unwrap();
    }

    #[test]
    fn missing_local_source_is_a_resolution_failure() {
        let temporary_directory = TempDir::new().unwrap();
        let source = SourceFile::new(
            Location::local(temporary_directory.child("missing.bin").path()),
            0,
        );

        assert_matches!(
            resolve_input(&source, None),
            Err(CopyError::SourceResolutionFailed { error, .. })
            if error.kind() == std::io::ErrorKind::NotFound
        );
    }

    #[test]
    fn share_output_stream_is_flushed_on_close() {
        #[derive(Debug, Default)]
        struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

        impl Write for SharedBuffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let contents = Arc::new(Mutex::new(Vec::new()));
        let mut handle = OutputHandle::Stream {
            writer: BufWriter::with_capacity(
                BUFFER_SIZE,
                Box::new(SharedBuffer(contents.clone())) as Box<dyn Write + Send>,
            ),
            origin: StreamOrigin::NetworkShare,
        };

        if let OutputHandle::Stream { writer, .. } = &mut handle {
            writer.write_all(b"buffered").unwrap();
        }
        assert!(contents.lock().unwrap().is_empty());

        handle.close().unwrap();
        assert_eq!(contents.lock().unwrap().as_slice(), b"buffered");
    }
}
