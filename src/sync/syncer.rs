use anyhow::Error;

use crate::git::Vcs;
use crate::progress::Progress;

/// What a sync run was asked to do.
pub struct SyncRequest<'a> {
    pub current_branch: &'a str,
    pub base_branch: &'a str,
    /// Stash before rebasing (set only when uncommitted changes exist and
    /// stashing was not disabled).
    pub stash_changes: bool,
}

/// Result of one sync invocation.
#[derive(Debug)]
pub struct SyncOutcome {
    pub success: bool,
    /// Whether a stash was taken at any point, including failed runs whose
    /// recovery popped it back.
    pub stashed: bool,
    pub error: Option<String>,
}

/// Runs the stash → fetch → rebase → stash-pop sequence.
///
/// Any step failure triggers best-effort recovery: abort the rebase, then
/// pop the stash if one was taken. Recovery failures are swallowed so the
/// reported error is always the one that broke the run.
pub struct BranchSyncer<'a, V: Vcs> {
    vcs: &'a V,
}

impl<'a, V: Vcs> BranchSyncer<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    /// Rebase the current branch onto `origin/<base>`.
    ///
    /// Stage labels are reported through `progress`; the outcome carries
    /// success, whether a stash was taken, and the original error on
    /// failure.
    pub fn sync(&self, request: &SyncRequest<'_>, progress: &dyn Progress) -> SyncOutcome {
        let mut stashed = false;

        if request.stash_changes {
            progress.stage("Stashing uncommitted changes...");
            if let Err(e) = self.vcs.stash() {
                return self.recover(e, stashed);
            }
            stashed = true;
        }

        progress.stage("Fetching latest changes...");
        if let Err(e) = self.vcs.fetch("origin") {
            return self.recover(e, stashed);
        }

        progress.stage(&format!(
            "Rebasing {} onto {}...",
            request.current_branch, request.base_branch
        ));
        if let Err(e) = self.vcs.rebase_onto(&format!("origin/{}", request.base_branch)) {
            return self.recover(e, stashed);
        }

        if stashed {
            progress.stage("Restoring stashed changes...");
            if let Err(e) = self.vcs.stash_pop() {
                return self.recover(e, stashed);
            }
        }

        SyncOutcome {
            success: true,
            stashed,
            error: None,
        }
    }

    fn recover(&self, cause: Error, stashed: bool) -> SyncOutcome {
        // Best effort only; a secondary failure here would just bury the
        // one the user needs to see.
        let _ = self.vcs.rebase_abort();
        if stashed {
            let _ = self.vcs.stash_pop();
        }
        SyncOutcome {
            success: false,
            stashed,
            error: Some(format!("{cause:#}")),
        }
    }
}
