use std::{
    fmt::Debug,
    io::{Read, Write},
};


/// A file on a network share.
///
/// Network shares only expose sequential streams, so both sides of
/// a copy that involves one are buffered streams.
pub trait NetworkShareFile: Send + Sync + Debug {
    /// Path or URL of the file on the share, used in errors and logs.
    fn path(&self) -> &str;

    /// Opens the share's native stream for reading the file.
    fn open_input_stream(&self) -> std::io::Result<Box<dyn Read + Send>>;

    /// Opens the share's native stream for writing the file, replacing its content.
    fn open_output_stream(&self) -> std::io::Result<Box<dyn Write + Send>>;
}
