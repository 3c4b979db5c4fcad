mod resolve;

use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::path::Path;
use tracing::{debug, info};

use crate::forge::{Existence, Forge, GhCli, remote_url};
use crate::git::{Git2Backend, RemoteChange, Vcs};
use crate::progress;
use crate::settings::{Config, GithubDefaults, load_file_config};

pub use resolve::{Target, resolve_name, resolve_owner};

/// Remote the working tree is published through.
pub const REMOTE_NAME: &str = "origin";

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub target: Target,
    pub created: bool,
    pub url: String,
    pub remote: RemoteChange,
    pub branch: String,
}

/// One publish run over a working tree.
///
/// Steps, each halting the run on failure:
/// 1. Check `dir` is a Git repository with at least one commit.
/// 2. Resolve the target `owner/name` and the checked-out branch.
/// 3. Ask the forge whether the repository exists, creating it (public) if not.
/// 4. Point `origin` at it, rewriting the URL if `origin` pointed elsewhere.
/// 5. Push the branch to the same name on `origin` and set it as upstream.
///
/// Nothing is rolled back: a repository created in step 3 stays created
/// if step 4 or 5 fails.
pub struct RepoSync<'a, V, F> {
    pub config: &'a Config,
    /// `None` reads `config.toml` once `dir` is known to be a repository.
    pub defaults: Option<&'a GithubDefaults>,
    pub env_user: Option<String>,
    pub vcs: V,
    pub forge: F,
}

impl<V: Vcs, F: Forge> RepoSync<'_, V, F> {
    /// Spinners stay hidden while debug logs are written to stderr.
    fn hide_spinner(&self) -> bool {
        self.config.debug_logging()
    }

    pub fn run(&self, dir: &Path) -> Result<SyncOutcome> {
        let is_repo = self
            .vcs
            .is_repository(dir)
            .context("failed to check Git repository")?;
        if !is_repo {
            bail!(
                "{} is not a Git repository with at least one commit",
                dir.display()
            );
        }
        debug!(dir = %dir.display(), "checked repository");

        let loaded;
        let defaults = match self.defaults {
            Some(defaults) => defaults,
            None => {
                loaded = load_file_config()?.github;
                &loaded
            }
        };

        let target = Target {
            owner: resolve_owner(
                self.config.github_user.as_deref(),
                self.env_user.as_deref(),
                defaults.user.as_deref(),
            )?,
            name: resolve_name(dir, self.config.repo_name.as_deref())?,
        };
        let branch = self.vcs.current_branch(dir)?;
        let full_name = target.full_name();
        debug!(owner = %target.owner, name = %target.name, %branch, "resolved target");

        let created = self.ensure_forge_repo(&full_name)?;

        let url = remote_url(
            &defaults.host,
            defaults.protocol,
            &target.owner,
            &target.name,
        );
        let published = self.publish(dir, &url, &branch);
        let remote = match published {
            Ok(remote) => remote,
            Err(e) if created => {
                return Err(e.context(format!(
                    "repository {} was created on GitHub; local configuration failed: retry push manually",
                    full_name
                )));
            }
            Err(e) => return Err(e),
        };

        info!(repo = %full_name, %branch, created, "done");
        Ok(SyncOutcome {
            target,
            created,
            url,
            remote,
            branch,
        })
    }

    /// Returns whether the repository had to be created.
    fn ensure_forge_repo(&self, full_name: &str) -> Result<bool> {
        let pb = progress::start(format!("looking up {}", full_name), self.hide_spinner());
        let existence = self.forge.repo_exists(full_name).and_then(|e| match e {
            Existence::QueryFailed(reason) => Err(anyhow!(reason)),
            other => Ok(other),
        });
        progress::finish(&pb, &existence, format!("looked up {}", full_name));
        let existence = existence
            .with_context(|| format!("failed to check whether {} exists", full_name))?;
        debug!(repo = full_name, ?existence, "checked existence");

        if existence == Existence::Exists {
            return Ok(false);
        }

        let pb = progress::start(format!("creating {}", full_name), self.hide_spinner());
        let res = self.forge.create_repo(full_name);
        progress::finish(&pb, &res, format!("created {}", full_name));
        res.context("failed to create GitHub repository")?;
        Ok(true)
    }

    fn publish(&self, dir: &Path, url: &str, branch: &str) -> Result<RemoteChange> {
        let remote = self
            .vcs
            .ensure_remote(dir, REMOTE_NAME, url)
            .context("failed to configure remote")?;
        debug!(remote = REMOTE_NAME, url, ?remote, "configured remote");

        let pb = progress::start(
            format!("pushing {} to {}", branch, REMOTE_NAME),
            self.hide_spinner(),
        );
        let res = self.vcs.push_branch(dir, REMOTE_NAME, branch);
        progress::finish(&pb, &res, format!("pushed {} to {}", branch, REMOTE_NAME));
        res.context("failed to push")?;
        debug!(%branch, "pushed");
        Ok(remote)
    }
}

/// CLI command: publish the current directory to GitHub.
///
/// # Errors
/// Returns the first failing step's error, with context added at each layer.
pub fn cmd_sync(config: &Config) -> Result<()> {
    let dir = env::current_dir().context("failed to get current directory")?;
    let sync = RepoSync {
        config,
        defaults: None,
        env_user: env::var("GITHUB_USER").ok(),
        vcs: Git2Backend,
        forge: GhCli::default(),
    };

    let outcome = sync.run(&dir)?;
    if let RemoteChange::Updated { previous_url } = &outcome.remote {
        println!("{} was {}", REMOTE_NAME, previous_url);
    }
    println!(
        "{} -> {} ({} {})",
        outcome.branch,
        outcome.url,
        outcome.target.full_name(),
        if outcome.created { "created" } else { "existing" }
    );
    Ok(())
}
