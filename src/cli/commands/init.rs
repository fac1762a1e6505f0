//! Init command: writes a default `echo-nexus.toml`.
//!
//! An existing configuration file is never overwritten unless `--force` is
//! given. Credentials are not written; they come from the environment.

use crate::config::{EchoNexusConfig, DEFAULT_CONFIG_FILE};
use crate::fs::FileSystemOperations;
use anyhow::{anyhow, Result};
use std::sync::Arc;

pub struct InitCommand {
    pub force: bool,
    pub dry_run: bool,
    config_path: String,
    fs_ops: Arc<dyn FileSystemOperations>,
}

impl InitCommand {
    pub fn new(force: bool, dry_run: bool, fs_ops: Arc<dyn FileSystemOperations>) -> Self {
        Self {
            force,
            dry_run,
            config_path: DEFAULT_CONFIG_FILE.to_string(),
            fs_ops,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = path.into();
        self
    }

    pub async fn execute(&self) -> Result<()> {
        if self.dry_run {
            println!("⚙️  ECHO NEXUS INIT (DRY RUN)");
        } else {
            println!("⚙️  ECHO NEXUS INIT");
        }
        println!("====================");
        println!();

        if self.fs_ops.exists(&self.config_path) && !self.force {
            return Err(anyhow!(
                "Configuration file {} already exists. Use --force to overwrite.",
                self.config_path
            ));
        }

        let config = EchoNexusConfig::default();
        let content = config
            .to_toml_string()
            .map_err(|e| anyhow!("Failed to render configuration: {}", e))?;

        if self.dry_run {
            println!("Would create configuration file: {}", self.config_path);
            println!();
            println!("{content}");
            return Ok(());
        }

        self.fs_ops
            .write(&self.config_path, content.as_bytes())
            .await
            .map_err(|e| anyhow!("Failed to write {}: {}", self.config_path, e))?;

        println!("✅ Wrote {}", self.config_path);
        println!("   🧠 Memory file: {}", config.memory.path.display());
        println!("   📦 Artifacts:   {}", config.artifacts.dir.display());
        println!();
        println!("💡 Override any value with ECHO_NEXUS_<SECTION>__<KEY>, e.g. ECHO_NEXUS_GIT__COMMIT_STATE=true");
        Ok(())
    }
}
