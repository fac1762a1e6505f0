use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "echo-nexus")]
#[command(version)]
#[command(about = "EchoNexus text-analysis processor")]
#[command(long_about = "EchoNexus runs one processor operation per invocation: it validates the \
                       operation envelope, dispatches the command to its handler, records the result \
                       in the JSON memory file and writes result and status artifacts. Start with \
                       'echo-nexus process --command diagnostic_scan'.")]
pub struct Cli {
    /// Configuration file (defaults to echo-nexus.toml when present)
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one operation end to end
    Process {
        /// Operation identifier (echo-<digits>-<16 hex chars>), generated when absent
        #[arg(long, help = "Operation ID; a fresh one is generated when omitted")]
        operation_id: Option<String>,
        /// Command naming the handler to run
        #[arg(long, help = "Handler name: text_analysis, code_generation, diagnostic_scan, workflow_synthesis")]
        command: Option<String>,
        /// Raw inputs, JSON or free text
        #[arg(long, help = "JSON inputs; non-JSON text is wrapped as {\"text\": ...}")]
        inputs: Option<String>,
        /// Session identifier
        #[arg(long, help = "Session ID (defaults to 'manual')")]
        session_id: Option<String>,
        /// Platform event document
        #[arg(long, env = "GITHUB_EVENT_PATH", help = "Path to the triggering event JSON")]
        event_path: Option<PathBuf>,
        /// Platform event name
        #[arg(long, env = "GITHUB_EVENT_NAME", help = "repository_dispatch or workflow_dispatch")]
        event_name: Option<String>,
        /// Commit (and push) the memory file after a successful run
        #[arg(long, help = "Commit the memory file back to the repository")]
        commit_state: bool,
    },
    /// Check an operation ID against the required format
    Validate {
        /// Candidate operation ID
        operation_id: String,
    },
    /// Print a freshly generated operation ID
    NewId,
    /// Inspect the operation memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Write a default echo-nexus.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
        /// Print the configuration instead of writing it
        #[arg(long, help = "Show what would be written without making changes")]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum MemoryAction {
    /// Print the whole memory or a single entry as JSON
    Show {
        #[arg(long, help = "Only print the entry for this operation ID")]
        operation_id: Option<String>,
    },
    /// Print entry count and store location
    Stats,
}
