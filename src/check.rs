//! Divergence checking and the hook-invoked `check` command.
//!
//! `check` runs on every branch switch, so its failure policy is fail-open:
//! a fetch that cannot reach the network, or a ref that cannot be compared,
//! must never brick normal git usage. The explicit `safe` command is the
//! fail-closed counterpart (see `safe.rs`). A deployment that would rather
//! block switches when the check cannot run should not rely on this hook.

use anyhow::Result;
use colored::Colorize;
use std::env;

use crate::config::ConfigStore;
use crate::git::{GitRepo, Vcs};
use crate::progress::Spinner;

/// Environment variable that disables the guard entirely when non-empty.
pub const BYPASS_ENV: &str = "BRANCHGUARD_BYPASS";

/// Ahead/behind/total commit counts between two branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub behind: usize,
    pub ahead: usize,
    pub total: usize,
}

impl Divergence {
    /// `total` is always the arithmetic sum of the two sides.
    pub fn new(behind: usize, ahead: usize) -> Self {
        Self {
            behind,
            ahead,
            total: behind + ahead,
        }
    }
}

/// Computes branch divergence and applies the threshold policy.
pub struct DivergenceChecker<'a, V: Vcs> {
    vcs: &'a V,
}

impl<'a, V: Vcs> DivergenceChecker<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    /// Compute the divergence between `base` and `target`.
    ///
    /// The fetch beforehand is best-effort: a failed fetch only means the
    /// comparison runs on whatever refs are known locally.
    ///
    /// # Errors
    /// Returns an error if the ahead/behind computation itself fails (bad
    /// ref, unrelated histories). Counts are never fabricated on error.
    pub fn check(&self, base: &str, target: &str) -> Result<Divergence> {
        let _ = self.vcs.fetch("origin");
        let counts = self.vcs.ahead_behind(base, target)?;
        Ok(Divergence::new(counts.behind, counts.ahead))
    }

    /// Whether switching between `base` and `target` is within the
    /// threshold. A failed check reads as unsafe.
    pub fn is_safe(&self, base: &str, target: &str, threshold: u32) -> bool {
        self.check(base, target)
            .map(|d| d.total <= threshold as usize)
            .unwrap_or(false)
    }
}

/// Whether the bypass variable is set to a non-empty value.
pub fn bypass_requested() -> bool {
    env::var_os(BYPASS_ENV).is_some_and(|v| !v.is_empty())
}

/// CLI command: decide whether a branch switch may proceed.
///
/// Called by the installed hook with the two refs git hands it. Exit 0
/// allows the switch, exit 1 blocks it.
pub fn cmd_check(from: &str, to: &str) -> Result<u8> {
    if bypass_requested() {
        return Ok(0);
    }
    if from.is_empty() || to.is_empty() {
        return Ok(0);
    }

    let repo = match GitRepo::discover() {
        Ok(repo) => repo,
        Err(e) => {
            // Fail open, same as any other infrastructure failure below.
            eprintln!(
                "{} {}",
                "⚠".yellow(),
                format!("could not check divergence: {e:#}").dimmed()
            );
            return Ok(0);
        }
    };

    let config = ConfigStore::new(&repo.git_dir()).load();
    if !config.enabled {
        return Ok(0);
    }

    let spin = Spinner::start(format!("Checking divergence: {from} → {to}"));
    match DivergenceChecker::new(&repo).check(from, to) {
        Err(e) => {
            spin.warn("Could not check divergence");
            eprintln!("{}", format!("{e:#}").dimmed());
            Ok(0)
        }
        Ok(divergence) if divergence.total > config.threshold as usize => {
            spin.fail(format!(
                "Blocked: {} divergent commits detected",
                divergence.total
            ));
            print_blocked_report(to, divergence, config.threshold);
            Ok(1)
        }
        Ok(divergence) => {
            spin.succeed(format!(
                "Safe to switch ({} divergent commits)",
                divergence.total
            ));
            Ok(0)
        }
    }
}

fn print_blocked_report(target: &str, divergence: Divergence, threshold: u32) {
    eprintln!();
    eprintln!(
        "{}",
        format!("Branch \"{target}\" has diverged significantly:").red()
    );
    eprintln!("  Behind: {} commits", divergence.behind);
    eprintln!("  Ahead:  {} commits", divergence.ahead);
    eprintln!(
        "  Total:  {} commits (threshold: {})",
        divergence.total, threshold
    );
    eprintln!();
    eprintln!("{}", "Recommended actions:".yellow());
    eprintln!("{}", format!("  1. git fetch origin {target}").dimmed());
    eprintln!("{}", format!("  2. git rebase origin/{target}").dimmed());
    eprintln!("{}", "  Or run: branchguard sync".dimmed());
    eprintln!();
    eprintln!(
        "{}",
        format!("To force the switch: {BYPASS_ENV}=1 git checkout {target}").dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::AheadBehind;
    use git2::{Oid, Repository, Signature};
    use serial_test::serial;
    use std::cell::RefCell;
    use tempfile::tempdir;

    /// Stub adapter covering only what the checker touches.
    struct StubVcs {
        fetch_fails: bool,
        counts: Option<AheadBehind>,
        calls: RefCell<Vec<&'static str>>,
    }

    impl StubVcs {
        fn new(counts: Option<AheadBehind>) -> Self {
            Self {
                fetch_fails: false,
                counts,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Vcs for StubVcs {
        fn current_branch(&self) -> Option<String> {
            unreachable!("checker never asks for the current branch")
        }
        fn has_uncommitted_changes(&self) -> Result<bool> {
            unreachable!()
        }
        fn fetch(&self, _remote: &str) -> Result<()> {
            self.calls.borrow_mut().push("fetch");
            if self.fetch_fails {
                anyhow::bail!("network unreachable")
            }
            Ok(())
        }
        fn ahead_behind(&self, _base: &str, _target: &str) -> Result<AheadBehind> {
            self.calls.borrow_mut().push("ahead_behind");
            self.counts
                .ok_or_else(|| anyhow::anyhow!("rev not found: feature"))
        }
        fn stash(&self) -> Result<()> {
            unreachable!()
        }
        fn stash_pop(&self) -> Result<()> {
            unreachable!()
        }
        fn rebase_onto(&self, _target: &str) -> Result<()> {
            unreachable!()
        }
        fn rebase_abort(&self) -> Result<()> {
            unreachable!()
        }
        fn checkout(&self, _branch: &str) -> Result<()> {
            unreachable!()
        }
        fn list_branches(&self) -> Result<Vec<String>> {
            unreachable!()
        }
    }

    #[test]
    fn total_is_the_sum_of_both_sides() {
        for (behind, ahead) in [(0, 0), (3, 4), (30, 20), (0, 7)] {
            let d = Divergence::new(behind, ahead);
            assert_eq!(d.total, behind + ahead);
        }
    }

    #[test]
    fn check_survives_a_failed_fetch() {
        let mut vcs = StubVcs::new(Some(AheadBehind { behind: 3, ahead: 4 }));
        vcs.fetch_fails = true;

        let divergence = DivergenceChecker::new(&vcs).check("main", "feature").unwrap();
        assert_eq!(divergence, Divergence::new(3, 4));
        assert_eq!(*vcs.calls.borrow(), vec!["fetch", "ahead_behind"]);
    }

    #[test]
    fn check_fails_when_counts_cannot_be_computed() {
        let vcs = StubVcs::new(None);
        let err = DivergenceChecker::new(&vcs)
            .check("main", "feature")
            .unwrap_err();
        assert!(err.to_string().contains("rev not found"));
    }

    #[test]
    fn is_safe_requires_success_and_total_within_threshold() {
        let under = StubVcs::new(Some(AheadBehind { behind: 3, ahead: 4 }));
        assert!(DivergenceChecker::new(&under).is_safe("main", "feature", 10));

        let over = StubVcs::new(Some(AheadBehind {
            behind: 30,
            ahead: 20,
        }));
        assert!(!DivergenceChecker::new(&over).is_safe("main", "feature", 10));

        let exact = StubVcs::new(Some(AheadBehind { behind: 5, ahead: 5 }));
        assert!(DivergenceChecker::new(&exact).is_safe("main", "feature", 10));

        let broken = StubVcs::new(None);
        assert!(!DivergenceChecker::new(&broken).is_safe("main", "feature", 10));
    }

    #[test]
    #[serial]
    fn bypass_needs_a_non_empty_value() {
        unsafe { env::remove_var(BYPASS_ENV) };
        assert!(!bypass_requested());

        unsafe { env::set_var(BYPASS_ENV, "") };
        assert!(!bypass_requested());

        unsafe { env::set_var(BYPASS_ENV, "1") };
        assert!(bypass_requested());

        unsafe { env::remove_var(BYPASS_ENV) };
    }

    #[test]
    #[serial]
    fn bypassed_check_touches_no_git_state() {
        unsafe { env::set_var(BYPASS_ENV, "1") };
        // Returns before the repository is even discovered.
        let code = cmd_check("main", "feature").unwrap();
        assert_eq!(code, 0);
        unsafe { env::remove_var(BYPASS_ENV) };
    }

    #[test]
    #[serial]
    fn empty_refs_allow_the_switch() {
        unsafe { env::remove_var(BYPASS_ENV) };
        assert_eq!(cmd_check("", "feature").unwrap(), 0);
        assert_eq!(cmd_check("main", "").unwrap(), 0);
    }

    /// Write a commit with an empty-ish tree onto `update_ref`.
    fn commit_on(repo: &Repository, update_ref: &str, parents: &[Oid], msg: &str) -> Oid {
        let sig = Signature::now("test", "test@example.com").unwrap();
        let tree_id = {
            let mut index = repo.index().unwrap();
            index.write_tree().unwrap()
        };
        let tree = repo.find_tree(tree_id).unwrap();
        let parent_commits: Vec<_> = parents
            .iter()
            .map(|id| repo.find_commit(*id).unwrap())
            .collect();
        let parent_refs: Vec<_> = parent_commits.iter().collect();
        repo.commit(Some(update_ref), &sig, &sig, msg, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    #[serial]
    fn diverged_switch_is_blocked_at_the_command_level() {
        unsafe { env::remove_var(BYPASS_ENV) };

        let td = tempdir().unwrap();
        let repo = Repository::init(td.path()).unwrap();

        // `feature` stays at the fork point while the default branch gains
        // 12 commits, well past the default threshold of 10; `near` trails
        // the tip by only 2.
        let c0 = commit_on(&repo, "HEAD", &[], "base");
        repo.branch("feature", &repo.find_commit(c0).unwrap(), false)
            .unwrap();
        let mut tip = c0;
        let mut near = c0;
        for n in 0..12 {
            tip = commit_on(&repo, "HEAD", &[tip], &format!("work {n}"));
            if n == 9 {
                near = tip;
            }
        }
        repo.branch("near", &repo.find_commit(near).unwrap(), false)
            .unwrap();
        let head = repo.head().unwrap().shorthand().unwrap().to_string();

        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(td.path()).unwrap();
        let blocked = cmd_check(&head, "feature").unwrap();
        let allowed = cmd_check(&head, "near").unwrap();
        std::env::set_current_dir(prev).unwrap();

        assert_eq!(blocked, 1);
        assert_eq!(allowed, 0);
    }
}
