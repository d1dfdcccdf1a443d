use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

/// Run a `git` command in the given working directory and capture stdout.
///
/// Used for the working-tree operations (stash, rebase, checkout) that must
/// leave the repository in a state the user's own `git` can resume or abort.
/// A conflicted rebase, for example, is continued with `git rebase --continue`
/// exactly as if the user had started it themselves.
///
/// # Errors
/// Returns an error if the `git` binary cannot be spawned, or if the command
/// exits non-zero. The error message carries the command line and stderr.
pub fn run_git(workdir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .current_dir(workdir)
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }
}
