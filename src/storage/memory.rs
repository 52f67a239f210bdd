//! In-memory file store fake for unit tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::storage::{FileStore, PosterUpload, validate_file_name};

#[derive(Default)]
pub struct InMemoryFileStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    deletes: Mutex<Vec<PathBuf>>,
}

impl InMemoryFileStore {
    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    /// Every path passed to `delete`, in call order
    pub fn deleted(&self) -> Vec<PathBuf> {
        self.deletes.lock().clone()
    }

    pub fn put(&self, path: PathBuf, content: Vec<u8>) {
        self.files.lock().insert(path, content);
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn exists(&self, dir: &Path, file_name: &str) -> io::Result<bool> {
        validate_file_name(file_name)?;
        Ok(self.contains(&dir.join(file_name)))
    }

    async fn store(&self, dir: &Path, upload: &PosterUpload) -> io::Result<String> {
        validate_file_name(&upload.file_name)?;
        self.put(dir.join(&upload.file_name), upload.content.clone());
        Ok(upload.file_name.clone())
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    async fn delete(&self, path: &Path) -> io::Result<()> {
        self.files.lock().remove(path);
        self.deletes.lock().push(path.to_path_buf());
        Ok(())
    }
}
