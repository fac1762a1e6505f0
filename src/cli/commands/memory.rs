use anyhow::{anyhow, Result};
use std::sync::Arc;

use crate::memory::{MemoryLoad, MemoryStore};

pub struct MemoryCommand {
    store: Arc<dyn MemoryStore>,
}

impl MemoryCommand {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// Print the whole memory, or one entry, as pretty JSON.
    pub async fn show(&self, operation_id: Option<&str>) -> Result<()> {
        let memory = match self.store.load().await {
            MemoryLoad::Loaded(memory) => memory,
            MemoryLoad::Missing => {
                println!("📭 No memory recorded yet at {}", self.store.location());
                return Ok(());
            }
            MemoryLoad::Unreadable { reason } => {
                return Err(anyhow!(
                    "Memory at {} is unreadable: {}",
                    self.store.location(),
                    reason
                ));
            }
        };

        match operation_id {
            Some(id) => {
                let entry = memory
                    .get(id)
                    .ok_or_else(|| anyhow!("No memory entry for operation '{}'", id))?;
                println!("{}", serde_json::to_string_pretty(entry)?);
            }
            None => println!("{}", memory.to_pretty_json()?),
        }
        Ok(())
    }

    pub async fn stats(&self) -> Result<()> {
        println!("🧠 EchoNexus memory");
        println!("   📍 Location: {}", self.store.location());

        match self.store.load().await {
            MemoryLoad::Loaded(memory) => {
                println!("   📊 Entries:  {}", memory.len());
                if let Some((id, entry)) = memory.iter().max_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp)) {
                    println!("   🕒 Latest:   {} ({}, {})", id, entry.command, entry.timestamp);
                }
            }
            MemoryLoad::Missing => println!("   📭 Not created yet"),
            MemoryLoad::Unreadable { reason } => {
                println!("   ⚠️  Unreadable: {reason}");
                println!("   The next successful run will start from an empty memory.");
            }
        }
        Ok(())
    }
}
