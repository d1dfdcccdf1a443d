use anyhow::{Context, Result};
use git2::{FetchOptions, RemoteCallbacks, Repository, StatusOptions};

use super::AheadBehind;

/// Build a `FetchOptions` with SSH-agent credentials enabled.
///
/// This allows fetches to authenticate using the user's SSH agent.
/// If no SSH key is found, it falls back to default credentials.
fn fetch_opts_with_creds() -> FetchOptions<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
            .or_else(|_| git2::Cred::default())
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(cb);
    fo
}

/// Fetch branches and tags from the given remote into the local repository.
///
/// # Errors
/// Returns an error if the remote is unknown or the fetch fails (network,
/// authentication, ...). The caller decides whether staleness is fatal.
pub fn fetch_remote(repo: &Repository, remote_name: &str) -> Result<()> {
    let mut fo = fetch_opts_with_creds();

    let mut remote = repo.find_remote(remote_name)?;
    remote
        .fetch(
            &[
                format!("refs/heads/*:refs/remotes/{}/*", remote_name),
                "refs/tags/*:refs/tags/*".to_string(),
            ],
            Some(&mut fo),
            None,
        )
        .with_context(|| format!("git fetch {}", remote_name))?;
    Ok(())
}

/// Count the commits on each side of the symmetric difference between two
/// refs: how many commits `target` has that `base` lacks (ahead), and how
/// many commits `base` has that `target` lacks (behind).
///
/// # Errors
/// Returns an error if either ref cannot be resolved to a commit, or if
/// the commit-graph walk between the two refs fails.
pub fn ahead_behind(repo: &Repository, base: &str, target: &str) -> Result<AheadBehind> {
    let base_id = repo
        .revparse_single(base)
        .with_context(|| format!("rev not found: {}", base))?
        .peel_to_commit()
        .with_context(|| format!("{} did not peel to a commit", base))?
        .id();
    let target_id = repo
        .revparse_single(target)
        .with_context(|| format!("rev not found: {}", target))?
        .peel_to_commit()
        .with_context(|| format!("{} did not peel to a commit", target))?
        .id();

    let (ahead, behind) = repo
        .graph_ahead_behind(target_id, base_id)
        .with_context(|| format!("failed to compare {} and {}", base, target))?;

    Ok(AheadBehind { behind, ahead })
}

/// Name of the branch HEAD is attached to, or `None` when HEAD is unborn,
/// detached, or unreadable.
pub fn current_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if !head.is_branch() {
        return None;
    }
    head.shorthand().map(|s| s.to_string())
}

/// Whether the working tree carries uncommitted changes, untracked files
/// included (a stash would sweep those up just the same).
///
/// # Errors
/// Returns an error if the status scan itself fails.
pub fn has_uncommitted_changes(repo: &Repository) -> Result<bool> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true);
    let statuses = repo
        .statuses(Some(&mut opts))
        .context("failed to read repository status")?;
    Ok(!statuses.is_empty())
}

/// List all branch names, local and remote-tracking.
///
/// # Errors
/// Returns an error if branch iteration fails or a branch name is not
/// valid UTF-8.
pub fn list_branches(repo: &Repository) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in repo.branches(None).context("failed to list branches")? {
        let (branch, _) = entry?;
        if let Some(name) = branch.name()? {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
