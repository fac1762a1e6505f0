use async_trait::async_trait;
use fd_lock::RwLock;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{Memory, MemoryError, MemoryLoad, MemoryStore};
use crate::fs::{FileSystemOperations, StandardFileSystem};

/// Memory store backed by one pretty-printed JSON file.
///
/// Saves go to a `.tmp` sibling that is then renamed over the real file, so
/// readers never observe a half-written document. With write locking on, an
/// advisory lock on a `.lock` sibling serializes concurrent writers. This
/// does not make read-modify-write cycles atomic: the last writer still wins.
pub struct FileMemoryStore {
    path: PathBuf,
    fs: Arc<dyn FileSystemOperations>,
    lock_writes: bool,
}

impl FileMemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fs: Arc::new(StandardFileSystem),
            lock_writes: true,
        }
    }

    /// Use a custom file system. Write locking is off because the lock file
    /// always lives on the real disk.
    pub fn with_file_system(path: impl Into<PathBuf>, fs: Arc<dyn FileSystemOperations>) -> Self {
        Self {
            path: path.into(),
            fs,
            lock_writes: false,
        }
    }

    pub fn with_write_lock(mut self, enabled: bool) -> Self {
        self.lock_writes = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn open_lock(&self) -> Result<RwLock<std::fs::File>, MemoryError> {
        let lock_path = self.sibling(".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| MemoryError::LockError {
                path: lock_path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(RwLock::new(file))
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn load(&self) -> MemoryLoad {
        let path = self.path.display().to_string();

        if !self.fs.exists(&path) {
            debug!(path = %path, "Memory file not found, starting empty");
            return MemoryLoad::Missing;
        }

        let content = match self.fs.read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                return MemoryLoad::Unreadable {
                    reason: format!("read failed: {e}"),
                }
            }
        };

        match serde_json::from_str::<Memory>(&content) {
            Ok(memory) => {
                debug!(path = %path, entries = memory.len(), "Memory loaded");
                MemoryLoad::Loaded(memory)
            }
            Err(e) => MemoryLoad::Unreadable {
                reason: format!("invalid memory document: {e}"),
            },
        }
    }

    async fn save(&self, memory: &Memory) -> Result<(), MemoryError> {
        let path = self.path.display().to_string();
        let write_failed = |e: anyhow::Error| MemoryError::WriteFailed {
            path: path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(&parent.display().to_string())
                .await
                .map_err(write_failed)?;
        }

        let serialized = memory.to_pretty_json()?;

        let mut lock = if self.lock_writes {
            Some(self.open_lock()?)
        } else {
            None
        };
        let _guard = match lock.as_mut() {
            Some(lock) => Some(lock.write().map_err(|e| MemoryError::LockError {
                path: path.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        let temp_path = self.sibling(".tmp").display().to_string();
        self.fs
            .write(&temp_path, serialized.as_bytes())
            .await
            .map_err(write_failed)?;
        self.fs
            .rename(&temp_path, &path)
            .await
            .map_err(write_failed)?;

        info!(path = %path, entries = memory.len(), "Memory saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
