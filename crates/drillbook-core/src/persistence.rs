//! Load/save access to the persisted record blob.
//!
//! The store only ever sees an opaque JSON value; where it lives is up to the
//! [`BlobStore`] implementation.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Backing storage for the record blob.
pub trait BlobStore {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Read the blob. `Ok(None)` means nothing has been saved yet.
    fn load_blob(&self) -> Result<Option<Value>, StoreError>;

    /// Replace the blob.
    fn save_blob(&self, blob: &Value) -> Result<(), StoreError>;
}

/// A JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileBlobStore {
    path: PathBuf,
}

impl JsonFileBlobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl BlobStore for JsonFileBlobStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_blob(&self) -> Result<Option<Value>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    fn save_blob(&self, blob: &Value) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        // Write next to the target so the final rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        serde_json::to_writer_pretty(&mut tmp, blob)
            .map_err(io::Error::from)
            .map_err(|e| self.io_error(e))?;
        tmp.write_all(b"\n").map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

/// In-memory blob storage for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blob: Mutex<Option<Value>>,
    saves: Mutex<u32>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing blob.
    pub fn with_blob(blob: Value) -> Self {
        Self {
            blob: Mutex::new(Some(blob)),
            saves: Mutex::new(0),
        }
    }

    /// The last saved blob, if any.
    pub fn contents(&self) -> Option<Value> {
        self.blob.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> u32 {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load_blob(&self) -> Result<Option<Value>, StoreError> {
        self.blob
            .lock()
            .map(|b| b.clone())
            .map_err(|_| StoreError::Malformed("memory store poisoned".into()))
    }

    fn save_blob(&self, blob: &Value) -> Result<(), StoreError> {
        let mut slot = self
            .blob
            .lock()
            .map_err(|_| StoreError::Malformed("memory store poisoned".into()))?;
        *slot = Some(blob.clone());
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
