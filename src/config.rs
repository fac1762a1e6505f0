use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "echo-nexus.toml";

/// Main configuration structure for EchoNexus
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EchoNexusConfig {
    /// Operation memory (state store) settings
    pub memory: MemoryConfig,
    /// Result and status artifact settings
    pub artifacts: ArtifactConfig,
    /// Committing the memory back to the repository
    pub git: GitConfig,
    /// Processor identity and defaults
    pub processor: ProcessorConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Secrets, only ever read from the environment
    #[serde(skip_serializing)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Path of the JSON memory file
    pub path: PathBuf,
    /// Hold an advisory lock while rewriting the file
    pub lock_writes: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("memory/echo_memory.json"),
            lock_writes: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory receiving echo_result.json and echo_status.json
    pub dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Commit the memory file after a successful run
    pub commit_state: bool,
    /// Push the commit to `remote`/`branch`
    pub push: bool,
    pub remote: String,
    pub branch: String,
    pub author_name: String,
    pub author_email: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            commit_state: false,
            push: true,
            remote: "origin".to_string(),
            branch: "main".to_string(),
            author_name: "EchoNexus Processor".to_string(),
            author_email: "echo-nexus@users.noreply.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Repository reported in status reports (defaults to GITHUB_REPOSITORY)
    pub repo: Option<String>,
    /// Command used when a trigger names none
    pub default_command: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            repo: None,
            default_command: "text_analysis".to_string(),
        }
    }
}

impl ProcessorConfig {
    pub fn repo_name(&self) -> &str {
        self.repo.as_deref().unwrap_or("local")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Credentials consumed from the environment. The AI provider keys are
/// accepted for compatibility with existing workflows; no command uses them.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("github_token", &mask(&self.github_token))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .finish()
    }
}

impl EchoNexusConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`explicit`, or echo-nexus.toml when present)
    /// 3. Environment variables (ECHO_NEXUS_<SECTION>__<KEY>)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("ECHO_NEXUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut echo_config: EchoNexusConfig = builder.build()?.try_deserialize()?;
        echo_config.apply_platform_env(|key| std::env::var(key).ok());
        Ok(echo_config)
    }

    /// Fill values the CI platform provides under its own names.
    pub fn apply_platform_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.processor.repo.is_none() {
            self.processor.repo = lookup("GITHUB_REPOSITORY").filter(|r| !r.is_empty());
        }

        let credentials = &mut self.credentials;
        if credentials.github_token.is_none() {
            credentials.github_token = lookup("GITHUB_TOKEN")
                .or_else(|| lookup("GH_TOKEN"))
                .filter(|t| !t.is_empty());
        }
        if credentials.openai_api_key.is_none() {
            credentials.openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty());
        }
        if credentials.anthropic_api_key.is_none() {
            credentials.anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty());
        }
    }

    /// Defaults plus platform variables, for when the layered load failed.
    pub fn platform_defaults() -> Self {
        let mut config = Self::default();
        config.apply_platform_env(|key| std::env::var(key).ok());
        config
    }

    /// Render as TOML. Credentials are never included.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists. Runs before logging is set up, so the
    /// caller reports whether a file was loaded.
    pub fn load_env_file() -> Result<bool> {
        if !Path::new(".env").exists() {
            return Ok(false);
        }
        dotenvy::dotenv()?;
        Ok(true)
    }
}
