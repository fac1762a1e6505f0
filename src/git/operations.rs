use anyhow::{anyhow, Context, Result};
use git2::{Commit, Cred, PushOptions, RemoteCallbacks, Repository, Signature};
use std::path::{Path, PathBuf};

/// Trait defining the git operations needed to persist state in a repository
pub trait GitOperations {
    /// Stage `paths` and commit them (replaces `git add` + `git commit`).
    /// Returns `None` when the staged tree equals HEAD's tree.
    fn commit_paths(&self, paths: &[PathBuf], message: &str) -> Result<Option<CommitInfo>>;

    /// Push a local branch to a remote (replaces `git push`)
    fn push(&self, remote: &str, branch: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
}

/// Implementation of GitOperations using git2
pub struct Git2Operations {
    repo: Repository,
    author_name: String,
    author_email: String,
    token: Option<String>,
}

impl Git2Operations {
    /// Open the repository containing `path`.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).context("Failed to open git repository")?;
        Ok(Self {
            repo,
            author_name: "EchoNexus Processor".to_string(),
            author_email: "echo-nexus@users.noreply.github.com".to_string(),
            token: None,
        })
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    /// Authenticate HTTPS pushes with a platform token instead of an SSH key.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn get_signature(&self) -> Result<Signature<'static>> {
        Signature::now(&self.author_name, &self.author_email)
            .context("Failed to create commit signature")
    }

    fn workdir(&self) -> Result<PathBuf> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| anyhow!("Repository has no working directory"))?;
        workdir
            .canonicalize()
            .context("Failed to resolve repository working directory")
    }

    /// Path of `path` relative to the working directory.
    fn relative_to_workdir(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self.workdir()?;
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            workdir.join(path)
        };
        let absolute = absolute
            .canonicalize()
            .with_context(|| format!("Path '{}' does not exist", path.display()))?;

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| anyhow!("Path '{}' is outside the repository", path.display()))
    }

    fn credentials_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let token = self.token.clone();
        callbacks.credentials(move |_url, username_from_url, _allowed_types| match &token {
            Some(token) => Cred::userpass_plaintext("x-access-token", token),
            None => Cred::ssh_key(
                username_from_url.unwrap_or("git"),
                None,
                Path::new(&format!(
                    "{}/.ssh/id_rsa",
                    std::env::var("HOME").unwrap_or_default()
                )),
                None,
            ),
        });
        callbacks
    }
}

impl GitOperations for Git2Operations {
    fn commit_paths(&self, paths: &[PathBuf], message: &str) -> Result<Option<CommitInfo>> {
        let mut index = self.repo.index()?;
        for path in paths {
            let relative = self.relative_to_workdir(path)?;
            index
                .add_path(&relative)
                .with_context(|| format!("Failed to stage '{}'", relative.display()))?;
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        // An unborn HEAD (fresh repository) has no parent commit.
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };

        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                return Ok(None);
            }
        }

        let signature = self.get_signature()?;
        let parents: Vec<&Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .context("Failed to create commit")?;

        Ok(Some(CommitInfo {
            id: oid.to_string(),
            message: message.to_string(),
            author: self.author_name.clone(),
            timestamp: signature.when().seconds(),
        }))
    }

    fn push(&self, remote_name: &str, branch: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .with_context(|| format!("Remote '{remote_name}' not found"))?;

        let head = self.repo.head().context("Nothing to push, HEAD is unborn")?;
        let source = match head.name() {
            Some(name) if name.starts_with("refs/heads/") => name.to_string(),
            _ => format!("refs/heads/{branch}"),
        };
        let refspec = format!("{source}:refs/heads/{branch}");

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(self.credentials_callbacks());

        remote
            .push(&[&refspec], Some(&mut push_options))
            .context("Failed to push to remote")?;

        Ok(())
    }
}
