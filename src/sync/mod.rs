mod syncer;

pub use syncer::{BranchSyncer, SyncOutcome, SyncRequest};

use anyhow::Result;
use colored::Colorize;

use crate::config::ConfigStore;
use crate::git::{GitRepo, Vcs};
use crate::progress::Spinner;

/// CLI command: rebase the current branch onto the base branch.
///
/// High-level flow:
/// 1. Resolve the current branch; bail out when it cannot be determined.
/// 2. Short-circuit as a no-op success when already on the base branch.
/// 3. Stash when uncommitted changes exist and stashing is enabled.
/// 4. Delegate to [`BranchSyncer`] (fetch, rebase, stash pop, recovery).
///
/// `base` overrides the configured base branch; `stash_enabled` is false
/// when the user passed `--no-stash`.
pub fn cmd_sync(base: Option<String>, stash_enabled: bool) -> Result<u8> {
    let spin = Spinner::start("Preparing to sync branch...");

    let repo = match GitRepo::discover() {
        Ok(repo) => repo,
        Err(e) => {
            spin.fail("Not a git repository");
            eprintln!("{}", format!("{e:#}").red());
            return Ok(1);
        }
    };

    let Some(current) = repo.current_branch() else {
        spin.fail("Could not determine current branch");
        return Ok(1);
    };

    let config = ConfigStore::new(&repo.git_dir()).load();
    let base = base.unwrap_or(config.base_branch);

    if current == base {
        spin.warn(format!("Already on {base}"));
        println!("Nothing to sync");
        return Ok(0);
    }

    spin.update("Checking repository status...");
    let has_changes = match repo.has_uncommitted_changes() {
        Ok(has_changes) => has_changes,
        Err(e) => {
            spin.fail("Sync failed");
            eprintln!("{}", format!("{e:#}").red());
            return Ok(1);
        }
    };

    let request = SyncRequest {
        current_branch: &current,
        base_branch: &base,
        stash_changes: stash_enabled && has_changes,
    };
    let outcome = BranchSyncer::new(&repo).sync(&request, &spin);

    if outcome.success {
        spin.succeed("Branch synced successfully");
        println!();
        println!("{} Rebased {} onto {}", "✔".green(), current, base);
        if outcome.stashed {
            println!("{} Restored stashed changes", "✔".green());
        }
        Ok(0)
    } else {
        spin.fail("Sync failed");
        if let Some(error) = outcome.error {
            eprintln!("{}", error.red());
        }
        Ok(1)
    }
}
