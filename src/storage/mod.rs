//! # Storage Module
//!
//! Poster file storage. The [`FileStore`] trait is the seam the movie service
//! talks to; [`LocalFileStore`] keeps files on the local filesystem.

pub mod file_store;

#[cfg(test)]
pub mod memory;

use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

pub use file_store::LocalFileStore;

/// An uploaded file as received from a multipart request
#[derive(Debug, Clone)]
pub struct PosterUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl PosterUpload {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// `None` for an empty upload, which update requests treat as "no new file"
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }

    /// Rejects empty content and unsafe file names before anything touches storage
    pub fn check(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::EmptyFile);
        }
        validate_file_name(&self.file_name).map_err(|e| AppError::Validation(e.to_string()))
    }
}

/// Poster file operations used by the movie service
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn exists(&self, dir: &Path, file_name: &str) -> io::Result<bool>;
    /// Writes the upload into `dir` and returns the stored file name
    async fn store(&self, dir: &Path, upload: &PosterUpload) -> io::Result<String>;
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    /// Removes the file; succeeds when it is already gone
    async fn delete(&self, path: &Path) -> io::Result<()>;
}

/// Reject names that would escape the poster directory
pub fn validate_file_name(file_name: &str) -> io::Result<()> {
    let invalid = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0'])
        || file_name.contains("..");
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid file name {file_name:?}"),
        ));
    }
    Ok(())
}
