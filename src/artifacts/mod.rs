//! Result artifact and status report files
//!
//! Both files live at fixed names inside the artifact directory and are
//! overwritten on every run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::fs::{FileSystemOperations, StandardFileSystem};

pub const RESULT_FILE: &str = "echo_result.json";
pub const STATUS_FILE: &str = "echo_status.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write artifact {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultArtifact {
    pub operation_id: String,
    pub command: String,
    pub result: Value,
    pub timestamp: String,
}

/// Terminal job status, in the platform's lowercase vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Failure,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Success => "success",
            JobStatus::Failure => "failure",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub operation_id: String,
    pub command: String,
    pub status: JobStatus,
    pub completed_at: String,
    pub artifacts_available: bool,
    pub processor_repo: String,
}

/// Writes the two per-run documents into one directory.
pub struct ArtifactWriter {
    dir: PathBuf,
    fs: Arc<dyn FileSystemOperations>,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_file_system(dir, Arc::new(StandardFileSystem))
    }

    pub fn with_file_system(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystemOperations>) -> Self {
        Self {
            dir: dir.into(),
            fs,
        }
    }

    pub fn result_path(&self) -> PathBuf {
        self.dir.join(RESULT_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    pub async fn write_result(&self, artifact: &ResultArtifact) -> Result<PathBuf, ArtifactError> {
        let path = self.result_path();
        self.write_json(&path, artifact).await?;
        tracing::info!(path = %path.display(), operation_id = %artifact.operation_id, "Result artifact written");
        Ok(path)
    }

    /// Delete a result artifact left over from an earlier run, so a failed
    /// run never ships a result that belongs to another operation.
    /// Returns whether a file was removed.
    pub async fn discard_result(&self) -> Result<bool, ArtifactError> {
        let path = self.result_path();
        let display = path.display().to_string();
        if !self.fs.exists(&display) {
            return Ok(false);
        }

        self.fs
            .remove_file(&display)
            .await
            .map_err(|e| ArtifactError::WriteFailed {
                path: display.clone(),
                reason: e.to_string(),
            })?;
        tracing::info!(path = %path.display(), "Discarded stale result artifact");
        Ok(true)
    }

    pub async fn write_status(&self, report: &StatusReport) -> Result<PathBuf, ArtifactError> {
        let path = self.status_path();
        self.write_json(&path, report).await?;
        tracing::info!(path = %path.display(), status = %report.status, "Status report written");
        Ok(path)
    }

    async fn write_json<T: Serialize + Sync>(&self, path: &Path, value: &T) -> Result<(), ArtifactError> {
        let display = path.display().to_string();
        let write_failed = |e: anyhow::Error| ArtifactError::WriteFailed {
            path: display.clone(),
            reason: e.to_string(),
        };

        let content = serde_json::to_string_pretty(value)?;
        if !self.dir.as_os_str().is_empty() {
            self.fs
                .create_dir_all(&self.dir.display().to_string())
                .await
                .map_err(write_failed)?;
        }
        self.fs
            .write(&display, content.as_bytes())
            .await
            .map_err(write_failed)
    }
}
