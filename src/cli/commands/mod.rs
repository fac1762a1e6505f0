use anyhow::Result;

use crate::config::EchoNexusConfig;
use crate::memory::FileMemoryStore;

pub mod init;
pub mod memory;
pub mod new_id;
pub mod process;
pub mod validate;

/// Memory store described by the configuration.
pub fn memory_store(config: &EchoNexusConfig) -> FileMemoryStore {
    FileMemoryStore::new(&config.memory.path).with_write_lock(config.memory.lock_writes)
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🔊 EchoNexus - Text-Analysis Processor");
    println!();
    println!("To get started:");
    println!("  🚀 echo-nexus process --command text_analysis --inputs '{{\"text\": \"hello world\"}}'");
    println!("  🆔 echo-nexus new-id       # Generate an operation ID");
    println!("  ✅ echo-nexus validate ID  # Check an operation ID");
    println!("  🧠 echo-nexus memory show  # Inspect remembered operations");
    println!();
    println!("Setup:");
    println!("  ⚙️  echo-nexus init         # Write echo-nexus.toml");
    println!();
    println!("💡 Inside a workflow, 'echo-nexus process' reads GITHUB_EVENT_PATH automatically.");
    Ok(())
}
