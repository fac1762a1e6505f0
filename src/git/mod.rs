//! Git operations module
//!
//! The memory file is made durable by committing it back to the repository
//! the processor runs in. Publication failures never fail a run; they are
//! reported as a [`PublishOutcome`].

pub mod operations;

pub use operations::{CommitInfo, Git2Operations, GitOperations};

use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::GitConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Committed {
        commit: CommitInfo,
        pushed: bool,
        push_error: Option<String>,
    },
    NothingToCommit,
    Failed {
        reason: String,
    },
}

impl PublishOutcome {
    pub fn is_failure(&self) -> bool {
        match self {
            PublishOutcome::Failed { .. } => true,
            PublishOutcome::Committed { push_error, .. } => push_error.is_some(),
            PublishOutcome::NothingToCommit => false,
        }
    }
}

/// Commit `paths` and optionally push. Errors are logged and folded into the
/// outcome.
pub fn publish_state(
    ops: &dyn GitOperations,
    paths: &[PathBuf],
    config: &GitConfig,
    message: &str,
) -> PublishOutcome {
    let commit = match ops.commit_paths(paths, message) {
        Ok(Some(commit)) => commit,
        Ok(None) => {
            info!("Memory unchanged, nothing to commit");
            return PublishOutcome::NothingToCommit;
        }
        Err(e) => {
            warn!(error = %e, "Failed to commit memory");
            return PublishOutcome::Failed {
                reason: format!("{e:#}"),
            };
        }
    };

    info!(commit = %commit.id, "Committed memory");

    if !config.push {
        return PublishOutcome::Committed {
            commit,
            pushed: false,
            push_error: None,
        };
    }

    match ops.push(&config.remote, &config.branch) {
        Ok(()) => {
            info!(remote = %config.remote, branch = %config.branch, "Pushed memory commit");
            PublishOutcome::Committed {
                commit,
                pushed: true,
                push_error: None,
            }
        }
        Err(e) => {
            warn!(error = %e, remote = %config.remote, "Failed to push memory commit");
            PublishOutcome::Committed {
                commit,
                pushed: false,
                push_error: Some(format!("{e:#}")),
            }
        }
    }
}
