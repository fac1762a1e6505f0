use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Memory, MemoryError, MemoryLoad, MemoryStore};

/// Process-local memory store, used as a fake in tests and for dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    document: Mutex<Option<Memory>>,
    saves: AtomicUsize,
}

impl InMemoryStore {
    /// A store with nothing persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory(memory: Memory) -> Self {
        Self {
            document: Mutex::new(Some(memory)),
            saves: AtomicUsize::new(0),
        }
    }

    /// What is currently persisted, if anything.
    pub fn snapshot(&self) -> Option<Memory> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn load(&self) -> MemoryLoad {
        match self.snapshot() {
            Some(memory) => MemoryLoad::Loaded(memory),
            None => MemoryLoad::Missing,
        }
    }

    async fn save(&self, memory: &Memory) -> Result<(), MemoryError> {
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(memory.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn location(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::OperationId;
    use crate::memory::MemoryEntry;
    use serde_json::json;

    #[tokio::test]
    async fn test_starts_missing_then_persists() {
        let store = InMemoryStore::new();
        assert_eq!(store.load().await, MemoryLoad::Missing);

        let mut memory = Memory::new();
        memory.record(
            &OperationId::parse("echo-3-0123456789abcdef").unwrap(),
            MemoryEntry::new("diagnostic_scan", json!({}), json!({"status": "healthy"})),
        );
        store.save(&memory).await.unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().await, MemoryLoad::Loaded(memory));
    }
}
