//! # branchguard
//!
//! **branchguard** blocks risky branch switches and resyncs diverged
//! branches.
//!
//! Features:
//! - `branchguard init` installs a `pre-checkout` hook and persists the
//!   guard configuration under `.git/branchguard/`
//! - `branchguard check` is invoked by the hook on every switch and blocks
//!   it when the divergence (ahead + behind commits) exceeds the threshold
//! - `branchguard safe <branch>` reports whether a switch would be safe
//! - `branchguard sync` stashes, fetches, and rebases the current branch
//!   onto the base branch, restoring the stash afterwards
//! - `branchguard status` shows repository, hook, and configuration state
//!
//! Set `BRANCHGUARD_BYPASS=1` to skip the guard for a single command.
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use branchguard::{cmd_check, cmd_init, cmd_safe, cmd_status, cmd_sync};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "branchguard",
    version,
    about = "Blocks risky branch switches and resyncs diverged branches",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Install the pre-checkout hook and persist the configuration
    Init {
        /// Overwrite an existing pre-checkout hook
        #[arg(long)]
        force: bool,
        /// Maximum allowed divergence in commits
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        threshold: u32,
    },
    /// Check whether a branch switch is safe (invoked by the hook)
    Check {
        /// Ref being switched away from
        #[arg(default_value = "")]
        from: String,
        /// Ref being switched to
        #[arg(default_value = "")]
        to: String,
    },
    /// Report whether switching to a branch would be safe
    Safe {
        /// Target branch to analyze
        branch: String,
    },
    /// Rebase the current branch onto the base branch
    Sync {
        /// Base branch to sync against (defaults to the configured one)
        #[arg(long)]
        base: Option<String>,
        /// Do not stash uncommitted changes first
        #[arg(long)]
        no_stash: bool,
    },
    /// Show repository, hook, and configuration state
    Status,
}

fn run(cli: Cli) -> Result<u8> {
    match cli.cmd {
        Cmd::Init { force, threshold } => cmd_init(force, threshold),
        Cmd::Check { from, to } => cmd_check(&from, &to),
        Cmd::Safe { branch } => cmd_safe(&branch),
        Cmd::Sync { base, no_stash } => cmd_sync(base, !no_stash),
        Cmd::Status => cmd_status(),
    }
}

/// CLI entry point.
///
/// Parses arguments with `clap`, executes the selected subcommand, and maps
/// its result to the process exit status.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {e:#}", "✘".red());
            ExitCode::FAILURE
        }
    }
}
