use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::process::Command;
use tracing::{debug, info};

use super::{CommandOutput, Existence, Forge, classify_view};

/// [`Forge`] implemented by shelling out to the GitHub CLI.
///
/// Authentication is whatever `gh auth login` stored; nothing is passed here.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: OsString,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new("gh")
    }
}

impl GhCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run `gh` with `args`, capturing both streams.
    ///
    /// # Errors
    /// Returns an error only if the process could not be started.
    pub fn exec(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(program = ?self.program, ?args, "running forge command");
        let output = Command::new(&self.program)
            .args(args)
            .env("GH_PROMPT_DISABLED", "1")
            .output()
            .with_context(|| format!("failed to run {}", self.program.to_string_lossy()))?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl Forge for GhCli {
    fn repo_exists(&self, full_name: &str) -> Result<Existence> {
        let out = self.exec(&["repo", "view", full_name])?;
        let existence = classify_view(full_name, &out);
        debug!(repo = full_name, ?existence, "repository lookup");
        Ok(existence)
    }

    fn create_repo(&self, full_name: &str) -> Result<()> {
        let out = self.exec(&["repo", "create", full_name, "--public"])?;
        if !out.success {
            bail!(
                "gh repo create {} failed: {}",
                full_name,
                out.diagnostic()
            );
        }
        info!(repo = full_name, url = out.stdout.trim(), "repository created");
        Ok(())
    }
}
