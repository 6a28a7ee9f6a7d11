use assert_fs::fixture::FixtureError;
use fs_transfer::error::CopyError;
use thiserror::Error;

/// Main `Error` for use in unit and integration tests.
///
/// Implements `From` for:
/// - [`std::io::Error`],
/// - [`FixtureError`] (from `assert_fs`), and
/// - [`CopyError`].
#[derive(Error, Debug)]
pub enum TestError {
    #[error("std::io::Error")]
    IoError(
        #[from]
        #[source]
        std::io::Error,
    ),

    #[error("assert_fs fixture error")]
    FixtureError(
        #[from]
        #[source]
        FixtureError,
    ),

    #[error("copy error")]
    CopyError(
        #[from]
        #[source]
        CopyError,
    ),
}

/// A main `Result` type for use in unit and integration tests (shorthand for the [`TestError`] error).
pub type TestResult<O = ()> = std::result::Result<O, TestError>;
