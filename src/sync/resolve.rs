use anyhow::{Result, anyhow, bail};
use std::path::Path;

/// The GitHub repository a working tree is published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub owner: String,
    pub name: String,
}

impl Target {
    /// `owner/name`, the form `gh` expects.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Repository name: the override if given, otherwise the last component of `dir`.
///
/// # Errors
/// Returns an error if `dir` has no final component (e.g. `/`).
pub fn resolve_name(dir: &Path, name_override: Option<&str>) -> Result<String> {
    if let Some(name) = non_empty(name_override) {
        return Ok(name.to_string());
    }
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("cannot derive a repository name from {}", dir.display()))
}

/// Repository owner, first non-empty of: `--github-user`, `GITHUB_USER`,
/// `github.user` in the defaults file.
///
/// # Errors
/// Returns an error when none of them is set.
pub fn resolve_owner(
    flag: Option<&str>,
    env_user: Option<&str>,
    file_user: Option<&str>,
) -> Result<String> {
    match non_empty(flag)
        .or_else(|| non_empty(env_user))
        .or_else(|| non_empty(file_user))
    {
        Some(owner) => Ok(owner.to_string()),
        None => bail!("no GitHub user: pass --github-user or set GITHUB_USER"),
    }
}
