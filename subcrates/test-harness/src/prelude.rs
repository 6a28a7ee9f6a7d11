pub use assert_fs::{prelude::*, TempDir};

pub use crate::assertable::{assert_content_eq, assert_file_content_eq};
pub use crate::doubles::{
    DirectoryDocumentProvider,
    HandleTracker,
    InMemoryShareFile,
    ProviderCall,
};
pub use crate::error::TestResult;
pub use crate::seeded_binary_data;
