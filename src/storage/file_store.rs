//! Local filesystem poster store backed by `tokio::fs`.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use crate::storage::{FileStore, PosterUpload, validate_file_name};

#[derive(Debug, Clone, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, dir: &Path, file_name: &str) -> io::Result<bool> {
        validate_file_name(file_name)?;
        fs::try_exists(dir.join(file_name)).await
    }

    async fn store(&self, dir: &Path, upload: &PosterUpload) -> io::Result<String> {
        validate_file_name(&upload.file_name)?;
        fs::create_dir_all(dir).await?;

        let path = dir.join(&upload.file_name);
        fs::write(&path, &upload.content).await?;
        tracing::debug!("Stored {} bytes at {}", upload.content.len(), path.display());

        Ok(upload.file_name.clone())
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn delete(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
