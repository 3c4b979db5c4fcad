//! Crate entry point for **reposync**.
//!
//! This library provides the internal implementation for the `reposync` CLI,
//! which publishes the current Git working tree to GitHub.
//! Each submodule encapsulates one responsibility (settings, git operations,
//! the GitHub CLI adapter, the publish workflow, etc.).
//!
//! This file is primarily intended for developers hacking on `reposync`.

mod forge;
mod git;
mod logging;
mod paths;
mod progress;
mod settings;
mod sync;

/// Re-export the pieces `main` and integrators need from `reposync::*`.
pub use forge::{CommandOutput, Existence, Forge, GhCli, classify_view, remote_url};
pub use git::{Git2Backend, RemoteChange, Vcs};
pub use logging::init as init_logging;
pub use settings::{Config, GithubDefaults, LogFormat, Protocol};
pub use sync::{RepoSync, SyncOutcome, Target, cmd_sync};
