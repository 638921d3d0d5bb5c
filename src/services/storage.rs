//! Durable key-value blob storage for the timer store

use std::{
    fs,
    io::{self, ErrorKind},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::debug;

use crate::error::StorageError;

/// Storage for the single serialized timer blob
pub trait BlobStore: Send + Sync + 'static {
    /// Read the stored blob, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored blob
    fn save(&self, blob: &str) -> Result<(), StorageError>;
}

/// Blob stored in a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved timers at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, blob: &str) -> Result<(), StorageError> {
        // Write next to the target and rename so a crash never leaves a torn file
        let temp = self.temp_path();
        fs::write(&temp, blob)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// In-memory blob, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let blob = self
            .blob
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(blob.clone())
    }

    fn save(&self, blob: &str) -> Result<(), StorageError> {
        let mut stored = self
            .blob
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        *stored = Some(blob.to_string());
        Ok(())
    }
}
