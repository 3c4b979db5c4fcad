//! Git integration layer.
//!
//! The workflow talks to the local repository through the [`Vcs`] trait.
//! [`Git2Backend`] is the real implementation, built on the `git2` crate;
//! tests substitute in-memory fakes.

mod git2_backend;

use anyhow::Result;
use std::path::Path;

/// What [`Vcs::ensure_remote`] had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChange {
    Created,
    Updated { previous_url: String },
    Unchanged,
}

/// Local version-control operations needed to publish a working tree.
pub trait Vcs {
    /// `Ok(false)` when `dir` is not a repository or has no commits yet.
    /// Corrupt repositories and I/O failures are errors.
    fn is_repository(&self, dir: &Path) -> Result<bool>;

    /// Short name of the checked-out branch. Detached HEAD is an error.
    fn current_branch(&self, dir: &Path) -> Result<String>;

    /// Make remote `name` point at `url`, creating it or rewriting its URL.
    fn ensure_remote(&self, dir: &Path, name: &str, url: &str) -> Result<RemoteChange>;

    /// Push `branch` to the same name on `remote` and record it as upstream.
    fn push_branch(&self, dir: &Path, remote: &str, branch: &str) -> Result<()>;
}

/// [`Vcs`] backed by libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Backend;

impl Vcs for Git2Backend {
    fn is_repository(&self, dir: &Path) -> Result<bool> {
        git2_backend::is_repository(dir)
    }

    fn current_branch(&self, dir: &Path) -> Result<String> {
        git2_backend::current_branch(dir)
    }

    fn ensure_remote(&self, dir: &Path, name: &str, url: &str) -> Result<RemoteChange> {
        git2_backend::ensure_remote(dir, name, url)
    }

    fn push_branch(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        git2_backend::push_branch(dir, remote, branch)
    }
}
