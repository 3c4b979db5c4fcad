//! GitHub access.
//!
//! The workflow only needs two questions answered: does `owner/name` exist,
//! and please create it. [`Forge`] captures that; [`GhCli`] answers by
//! running the `gh` command-line client.

mod gh;

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use crate::settings::Protocol;

pub use gh::GhCli;

/// Result of asking the forge whether a repository exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Existence {
    Exists,
    Absent,
    QueryFailed(String),
}

/// Remote repository operations.
pub trait Forge {
    /// Look up `full_name` (`owner/name`).
    ///
    /// `Err` means the forge could not be asked at all; a forge that answered
    /// with an unrecognised error yields [`Existence::QueryFailed`].
    fn repo_exists(&self, full_name: &str) -> Result<Existence>;

    /// Create `full_name` as a public repository.
    fn create_repo(&self, full_name: &str) -> Result<()>;
}

/// Captured result of one forge CLI invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Best available explanation of a failed invocation.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

static UNRESOLVED_REPO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Could not resolve to a Repository with the name '([^']+)'")
        .expect("static regex")
});

/// Interpret the output of `gh repo view <full_name>`.
///
/// `gh` has no structured "not found" status, so absence is recognised from
/// its message text. Two wordings are known:
/// - `Error: Not Found` on stdout
/// - `Could not resolve to a Repository with the name '<owner/name>'` on stderr
///
/// Anything else that failed is reported as [`Existence::QueryFailed`].
/// If `gh` changes its wording, this is the only place to update.
pub fn classify_view(full_name: &str, out: &CommandOutput) -> Existence {
    if out.success {
        return Existence::Exists;
    }
    if out.stdout.contains("Error: Not Found") {
        return Existence::Absent;
    }
    if UNRESOLVED_REPO
        .captures_iter(&out.stderr)
        .any(|c| c[1].eq_ignore_ascii_case(full_name))
    {
        return Existence::Absent;
    }
    Existence::QueryFailed(out.diagnostic())
}

/// URL for `owner/name` on `host`.
///
/// SSH: `git@<host>:<owner>/<name>.git`; HTTPS: `https://<host>/<owner>/<name>.git`.
pub fn remote_url(host: &str, protocol: Protocol, owner: &str, name: &str) -> String {
    match protocol {
        Protocol::Ssh => format!("git@{}:{}/{}.git", host, owner, name),
        Protocol::Https => format!("https://{}/{}/{}.git", host, owner, name),
    }
}
