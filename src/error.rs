use std::path::PathBuf;

use thiserror::Error;

/// Failures that belong to the store itself rather than to the filesystem
/// or the serializer.
///
/// Every public operation returns `anyhow::Result`; use
/// `err.downcast_ref::<StoreError>()` to tell these apart from I/O errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing collection - {0}")]
    MissingCollection(&'static str),

    #[error("missing resource - {0}")]
    MissingResource(&'static str),

    #[error("unable to find file or directory named {}", .0.display())]
    NotFound(PathBuf),
}
