//! File system operations abstraction for testing
//!
//! The memory store and the artifact writer go through this trait so that
//! they can run against the real disk in production and against a
//! `mockall` mock in unit tests.
//!
//! # Examples
//!
//! ```rust,no_run
//! use echo_nexus::fs::{FileSystemOperations, StandardFileSystem};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fs_ops: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
//!
//!     fs_ops.create_dir_all("artifacts").await?;
//!     fs_ops.write("artifacts/echo_result.json", b"{}").await?;
//!
//!     if fs_ops.exists("artifacts/echo_result.json") {
//!         println!("Result artifact written");
//!     }
//!
//!     Ok(())
//! }
//! ```
use anyhow::Result;
use std::path::Path;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Create a directory and all its parent directories
    async fn create_dir_all(&self, path: &str) -> Result<()>;

    /// Write data to a file, creating the file if it doesn't exist
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Read a whole file as UTF-8
    async fn read_to_string(&self, path: &str) -> Result<String>;

    /// Atomically replace `to` with `from`
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Delete a file
    async fn remove_file(&self, path: &str) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &str) -> bool;
}

/// Standard implementation that uses actual file system operations
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn create_dir_all(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir_all(path).await.map_err(Into::into)
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        tokio::fs::write(path, contents).await.map_err(Into::into)
    }

    async fn read_to_string(&self, path: &str) -> Result<String> {
        tokio::fs::read_to_string(path).await.map_err(Into::into)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        tokio::fs::rename(from, to).await.map_err(Into::into)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        tokio::fs::remove_file(path).await.map_err(Into::into)
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_standard_file_system_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested/dir");
        let dir = dir.to_str().unwrap();
        let fs_ops = StandardFileSystem;

        fs_ops.create_dir_all(dir).await.unwrap();
        let tmp = format!("{dir}/file.tmp");
        let target = format!("{dir}/file.json");
        fs_ops.write(&tmp, b"{\"ok\":true}").await.unwrap();
        fs_ops.rename(&tmp, &target).await.unwrap();

        assert!(!fs_ops.exists(&tmp));
        assert!(fs_ops.exists(&target));
        assert_eq!(fs_ops.read_to_string(&target).await.unwrap(), "{\"ok\":true}");

        fs_ops.remove_file(&target).await.unwrap();
        assert!(!fs_ops.exists(&target));
    }
}
