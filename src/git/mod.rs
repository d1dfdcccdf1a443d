//! Git integration layer.
//!
//! The [`Vcs`] trait is the surface the rest of the crate programs against;
//! [`GitRepo`] is the real implementation. Read-only queries and fetches go
//! through the `git2` crate (`git2_backend`). Working-tree mutations (stash,
//! rebase, checkout) shell out to the `git` binary (`cli_backend`) so that
//! anything left half-done, like a conflicted rebase, is in exactly the state
//! the user's own `git rebase --continue` / `--abort` expects.

mod cli_backend;
mod git2_backend;

use anyhow::{Context, Result, anyhow};
use git2::Repository;
use std::path::{Path, PathBuf};

/// Ahead/behind commit counts between two refs.
///
/// `ahead` is the number of commits reachable from the target but not the
/// base; `behind` is the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AheadBehind {
    pub behind: usize,
    pub ahead: usize,
}

/// Version-control operations the guard needs.
///
/// The divergence checker and branch syncer take an implementation of this
/// trait instead of talking to git directly, so tests can substitute a stub.
pub trait Vcs {
    /// Name of the branch HEAD is on, if it can be determined.
    fn current_branch(&self) -> Option<String>;
    /// Whether the working tree has uncommitted (or untracked) changes.
    fn has_uncommitted_changes(&self) -> Result<bool>;
    /// Update remote-tracking refs from the given remote.
    fn fetch(&self, remote: &str) -> Result<()>;
    /// Commit counts on each side of `base...target`.
    fn ahead_behind(&self, base: &str, target: &str) -> Result<AheadBehind>;
    /// Stash the working tree, including untracked files' tracked siblings.
    fn stash(&self) -> Result<()>;
    /// Pop the most recent stash entry.
    fn stash_pop(&self) -> Result<()>;
    /// Rebase the current branch onto the given ref.
    fn rebase_onto(&self, target: &str) -> Result<()>;
    /// Abort an in-progress rebase.
    fn rebase_abort(&self) -> Result<()>;
    /// Check out the given branch.
    fn checkout(&self, branch: &str) -> Result<()>;
    /// All branch names, local and remote-tracking.
    fn list_branches(&self) -> Result<Vec<String>>;
}

/// Whether the current directory is inside a git repository.
///
/// Never errors; any detection failure reads as "no".
pub fn is_repository() -> bool {
    Repository::discover(".").is_ok()
}

/// A discovered working repository.
pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Discover the repository containing the current directory.
    ///
    /// # Errors
    /// Returns an error if no repository is found or it has no working tree
    /// (bare repositories cannot be guarded).
    pub fn discover() -> Result<Self> {
        let repo = Repository::discover(".").context("not a git repository")?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("repository has no working tree"))?;
        Ok(Self { repo, workdir })
    }

    /// Path to the repository's metadata directory (usually `.git/`).
    ///
    /// Both the hook file and the persisted configuration live under it.
    pub fn git_dir(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }
}

impl Vcs for GitRepo {
    fn current_branch(&self) -> Option<String> {
        git2_backend::current_branch(&self.repo)
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        git2_backend::has_uncommitted_changes(&self.repo)
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        git2_backend::fetch_remote(&self.repo, remote)
    }

    fn ahead_behind(&self, base: &str, target: &str) -> Result<AheadBehind> {
        git2_backend::ahead_behind(&self.repo, base, target)
    }

    fn stash(&self) -> Result<()> {
        cli_backend::run_git(&self.workdir, &["stash"]).map(|_| ())
    }

    fn stash_pop(&self) -> Result<()> {
        cli_backend::run_git(&self.workdir, &["stash", "pop"]).map(|_| ())
    }

    fn rebase_onto(&self, target: &str) -> Result<()> {
        cli_backend::run_git(&self.workdir, &["rebase", target]).map(|_| ())
    }

    fn rebase_abort(&self) -> Result<()> {
        cli_backend::run_git(&self.workdir, &["rebase", "--abort"]).map(|_| ())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        cli_backend::run_git(&self.workdir, &["checkout", branch]).map(|_| ())
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        git2_backend::list_branches(&self.repo)
    }
}
