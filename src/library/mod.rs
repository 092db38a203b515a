mod manager;
mod snapshot;

pub use manager::{AddSingerOutcome, LibraryManager};
pub use snapshot::{LibrarySnapshot, SingerGroup};

use thiserror::Error;

/// Errors surfaced by library operations.
///
/// Validation errors are caught before any backend call; backend errors carry
/// the store's message verbatim.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        LibraryError::Backend(err.to_string())
    }
}
