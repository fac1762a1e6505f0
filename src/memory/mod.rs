//! Operation memory
//!
//! A single JSON document mapping operation ids to what each operation did.
//! It is read in full at the start of a run, amended in memory, and rewritten
//! in full at the end. Rerunning an id overwrites its entry.

pub mod file_store;
pub mod in_memory;

pub use file_store::FileMemoryStore;
pub use in_memory::InMemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::envelope::OperationId;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Lock acquisition failed for {path}: {reason}")]
    LockError { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// One remembered operation.
///
/// Every field defaults so that stores written by older processors still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub inputs: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub timestamp: String,
}

impl MemoryEntry {
    pub fn new(command: impl Into<String>, inputs: Value, result: Value) -> Self {
        Self {
            command: command.into(),
            inputs,
            result,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The whole store, keyed by operation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memory {
    entries: BTreeMap<String, MemoryEntry>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `operation_id`.
    /// Returns the entry it replaced, if any.
    pub fn record(&mut self, operation_id: &OperationId, entry: MemoryEntry) -> Option<MemoryEntry> {
        self.entries.insert(operation_id.to_string(), entry)
    }

    pub fn get(&self, operation_id: &str) -> Option<&MemoryEntry> {
        self.entries.get(operation_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MemoryEntry)> {
        self.entries.iter()
    }

    pub fn to_pretty_json(&self) -> Result<String, MemoryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of reading the store. Loading never fails; callers decide what an
/// absent or unreadable store means for them.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryLoad {
    Loaded(Memory),
    Missing,
    Unreadable { reason: String },
}

impl MemoryLoad {
    /// The loaded memory, or an empty mapping for a missing or unreadable store.
    pub fn into_memory(self) -> Memory {
        match self {
            MemoryLoad::Loaded(memory) => memory,
            MemoryLoad::Missing | MemoryLoad::Unreadable { .. } => Memory::new(),
        }
    }

    pub fn existed(&self) -> bool {
        !matches!(self, MemoryLoad::Missing)
    }
}

/// Read/write interface for the operation memory
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Read the persisted mapping
    async fn load(&self) -> MemoryLoad;

    /// Rewrite the persisted mapping completely
    async fn save(&self, memory: &Memory) -> Result<(), MemoryError>;

    /// Human readable location of the store, for logs and reports
    fn location(&self) -> String;
}
