//! Shared fixtures for `fs-transfer`'s integration tests:
//! seeded test data, content assertions and in-memory doubles
//! for the collaborators a copy talks to (document providers and network shares).

pub mod assertable;
pub mod doubles;
pub mod error;
mod seeded_data;

pub mod prelude;

pub use seeded_data::seeded_binary_data;
