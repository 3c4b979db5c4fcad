use anyhow::{Context, Result, anyhow, bail};
use git2::{
    Config, ConfigLevel, Cred, CredentialType, ErrorCode, PushOptions, RemoteCallbacks, Repository,
};
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, warn};

use super::RemoteChange;

/// Give up after this many credential callbacks; libgit2 keeps asking otherwise.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

fn open(dir: &Path) -> Result<Repository> {
    Repository::open(dir)
        .with_context(|| format!("failed to open Git repository at {}", dir.display()))
}

/// Report whether `dir` is a Git working tree with a resolvable HEAD.
///
/// Only `dir` itself is inspected; parent directories are not searched.
///
/// # Errors
/// Returns an error if the repository exists but cannot be opened or its
/// HEAD cannot be read for a reason other than "no commits yet".
pub fn is_repository(dir: &Path) -> Result<bool> {
    let repo = match Repository::open(dir) {
        Ok(repo) => repo,
        Err(e) if e.code() == ErrorCode::NotFound => {
            debug!(dir = %dir.display(), "not a git repository");
            return Ok(false);
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to open Git repository at {}", dir.display()));
        }
    };

    match repo.head() {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            debug!(dir = %dir.display(), "repository has no commits");
            Ok(false)
        }
        Err(e) => Err(e).context("failed to get HEAD reference"),
    }
}

/// Short name of the branch HEAD points at.
///
/// # Errors
/// Returns an error if HEAD is detached or unreadable.
pub fn current_branch(dir: &Path) -> Result<String> {
    let repo = open(dir)?;
    let head = repo.head().context("failed to get HEAD reference")?;
    if !head.is_branch() {
        bail!("HEAD is detached; check out a branch before pushing");
    }
    head.shorthand()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("branch name is not valid UTF-8"))
}

/// Create remote `name` with `url`, or rewrite its URL if it points elsewhere.
pub fn ensure_remote(dir: &Path, name: &str, url: &str) -> Result<RemoteChange> {
    let repo = open(dir)?;

    let existing = match repo.find_remote(name) {
        Ok(remote) => Some(remote.url().unwrap_or_default().to_string()),
        Err(e) if e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(e).with_context(|| format!("failed to look up remote {}", name)),
    };

    match existing {
        None => {
            repo.remote(name, url)
                .with_context(|| format!("failed to add remote {} -> {}", name, url))?;
            debug!(remote = name, url, "remote added");
            Ok(RemoteChange::Created)
        }
        Some(previous_url) if previous_url == url => {
            debug!(remote = name, url, "remote already configured");
            Ok(RemoteChange::Unchanged)
        }
        Some(previous_url) => {
            repo.remote_set_url(name, url)
                .with_context(|| format!("failed to set URL of remote {} to {}", name, url))?;
            warn!(remote = name, from = %previous_url, to = url, "remote URL replaced");
            Ok(RemoteChange::Updated { previous_url })
        }
    }
}

/// Build remote callbacks that authenticate through the SSH agent for SSH
/// URLs and through the git credential helper for HTTPS.
fn push_callbacks<'a>(git_config: Config, rejected: &'a RefCell<Vec<String>>) -> RemoteCallbacks<'a> {
    let mut attempts = 0;
    let mut cb = RemoteCallbacks::new();
    cb.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
        } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            Cred::credential_helper(&git_config, url, username_from_url)
        } else {
            Cred::default()
        }
    });
    cb.push_update_reference(move |refname, status| {
        if let Some(msg) = status {
            rejected.borrow_mut().push(format!("{}: {}", refname, msg));
        }
        Ok(())
    });
    cb
}

/// Push `refs/heads/<branch>` to the same ref on `remote_name`, then record
/// `<remote_name>/<branch>` as the branch's upstream.
///
/// # Errors
/// Returns an error on authentication or network failure, or when the
/// server rejects the update (e.g. non-fast-forward).
pub fn push_branch(dir: &Path, remote_name: &str, branch: &str) -> Result<()> {
    let repo = open(dir)?;
    let mut remote = repo
        .find_remote(remote_name)
        .with_context(|| format!("remote {} not found", remote_name))?;

    let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
    let rejected = RefCell::new(Vec::new());
    let mut opts = PushOptions::new();
    opts.remote_callbacks(push_callbacks(repo.config()?, &rejected));

    debug!(remote = remote_name, %refspec, "pushing");
    remote
        .push(&[refspec.as_str()], Some(&mut opts))
        .with_context(|| format!("git push {} {}", remote_name, branch))?;

    let rejected = rejected.borrow();
    if !rejected.is_empty() {
        bail!(
            "git push {} {} rejected: {}",
            remote_name,
            branch,
            rejected.join("; ")
        );
    }

    set_upstream(&repo, remote_name, branch)
}

fn set_upstream(repo: &Repository, remote_name: &str, branch: &str) -> Result<()> {
    let mut cfg = repo
        .config()?
        .open_level(ConfigLevel::Local)
        .context("failed to open repository config")?;
    cfg.set_str(&format!("branch.{}.remote", branch), remote_name)?;
    cfg.set_str(
        &format!("branch.{}.merge", branch),
        &format!("refs/heads/{}", branch),
    )?;
    debug!(branch, upstream = %format!("{}/{}", remote_name, branch), "upstream set");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{RepositoryInitOptions, Signature};
    use std::fs;
    use tempfile::tempdir;

    fn init_repo(dir: &Path) -> Repository {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        Repository::init_opts(dir, &opts).unwrap()
    }

    fn commit_file(repo: &Repository, name: &str, body: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        fs::write(workdir.join(name), body).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("test", "test@example.com").unwrap();
        let parents: Vec<git2::Commit> = match repo.head() {
            Ok(h) => vec![h.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        let td = tempdir().unwrap();
        assert!(!is_repository(td.path()).unwrap());
    }

    #[test]
    fn repository_without_commits_is_not_ready() {
        let td = tempdir().unwrap();
        init_repo(td.path());
        assert!(!is_repository(td.path()).unwrap());
    }

    #[test]
    fn repository_with_commit_is_detected() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        commit_file(&repo, "README.md", "hello\n");
        assert!(is_repository(td.path()).unwrap());
    }

    #[test]
    fn current_branch_reports_short_name() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        commit_file(&repo, "README.md", "hello\n");
        assert_eq!(current_branch(td.path()).unwrap(), "main");
    }

    #[test]
    fn current_branch_rejects_detached_head() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        let oid = commit_file(&repo, "README.md", "hello\n");
        repo.set_head_detached(oid).unwrap();

        let err = current_branch(td.path()).unwrap_err();
        assert!(err.to_string().contains("detached"));
    }

    #[test]
    fn ensure_remote_creates_then_is_idempotent() {
        let td = tempdir().unwrap();
        init_repo(td.path());
        let url = "git@github.com:alice/demo.git";

        assert_eq!(
            ensure_remote(td.path(), "origin", url).unwrap(),
            RemoteChange::Created
        );
        assert_eq!(
            ensure_remote(td.path(), "origin", url).unwrap(),
            RemoteChange::Unchanged
        );
        let repo = Repository::open(td.path()).unwrap();
        assert_eq!(repo.find_remote("origin").unwrap().url(), Some(url));
    }

    #[test]
    fn ensure_remote_rewrites_conflicting_url() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        repo.remote("origin", "git@github.com:someone/else.git")
            .unwrap();

        let got = ensure_remote(td.path(), "origin", "git@github.com:alice/demo.git").unwrap();

        assert_eq!(
            got,
            RemoteChange::Updated {
                previous_url: "git@github.com:someone/else.git".to_string()
            }
        );
        let repo = Repository::open(td.path()).unwrap();
        assert_eq!(
            repo.find_remote("origin").unwrap().url(),
            Some("git@github.com:alice/demo.git")
        );
    }

    #[test]
    fn push_branch_updates_bare_remote_and_sets_upstream() {
        let td = tempdir().unwrap();
        let work = td.path().join("work");
        let bare = td.path().join("remote.git");
        fs::create_dir_all(&work).unwrap();
        Repository::init_bare(&bare).unwrap();

        let repo = init_repo(&work);
        let oid = commit_file(&repo, "README.md", "hello\n");
        ensure_remote(&work, "origin", bare.to_str().unwrap()).unwrap();

        push_branch(&work, "origin", "main").unwrap();

        let remote_repo = Repository::open_bare(&bare).unwrap();
        let pushed = remote_repo.find_reference("refs/heads/main").unwrap();
        assert_eq!(pushed.target(), Some(oid));

        let cfg = Repository::open(&work).unwrap().config().unwrap();
        assert_eq!(cfg.get_string("branch.main.remote").unwrap(), "origin");
        assert_eq!(
            cfg.get_string("branch.main.merge").unwrap(),
            "refs/heads/main"
        );
    }

    #[test]
    fn push_branch_requires_remote() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        commit_file(&repo, "README.md", "hello\n");

        let err = push_branch(td.path(), "origin", "main").unwrap_err();
        assert!(err.to_string().contains("remote origin not found"));
    }
}
