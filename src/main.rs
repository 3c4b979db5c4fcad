//! # reposync
//!
//! **reposync** publishes the current Git working tree to GitHub.
//!
//! Run inside a repository with at least one commit:
//! - checks whether `owner/name` exists on GitHub (via the `gh` CLI)
//! - creates it as a public repository if it does not
//! - points `origin` at it
//! - pushes the current branch and sets it as upstream
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use reposync::{Config, LogFormat, cmd_sync, init_logging};
use std::process::ExitCode;

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "reposync",
    version,
    about = "reposync - create the GitHub repository for this directory and push to it"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text or json); giving the flag at all enables debug logging
    #[arg(
        long,
        value_name = "FORMAT",
        num_args = 0..=1,
        default_missing_value = "text"
    )]
    log_format: Option<LogFormat>,

    /// GitHub user owning the repository (overrides GITHUB_USER)
    #[arg(long, value_name = "NAME")]
    github_user: Option<String>,

    /// Repository name (defaults to the current directory name)
    #[arg(long, value_name = "NAME")]
    repo_name: Option<String>,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            verbose: cli.verbose,
            log_format: cli.log_format,
            github_user: cli.github_user,
            repo_name: cli.repo_name,
        }
    }
}

fn run(config: &Config) -> Result<()> {
    init_logging(config)?;
    cmd_sync(config)
}

/// CLI entry point. Exits 1 on any failure after printing the error chain.
fn main() -> ExitCode {
    let config = Config::from(Cli::parse());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
