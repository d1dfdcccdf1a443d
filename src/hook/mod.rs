//! Guard hook lifecycle.
//!
//! The guard installs a `pre-checkout` script into the repository's hooks
//! directory. Ownership is recognized by a marker token in the file content;
//! the detection heuristic lives entirely behind [`HookManager`] so it could
//! later be swapped for a checksum or version header without touching the
//! callers.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Token that marks a hook file as written by this tool.
pub const MARKER: &str = "branchguard";

/// Script installed as `pre-checkout`.
///
/// The hook receives the previous and new refs as positional arguments and
/// must exit non-zero to abort the switch. Both the bypass variable and the
/// usual CI indicators short-circuit before any real work.
const HOOK_SCRIPT: &str = r#"#!/bin/sh
# branchguard pre-checkout hook
# Blocks branch switches whose divergence exceeds the configured threshold.

if [ -n "$BRANCHGUARD_BYPASS" ]; then
  exit 0
fi

if [ -n "$CI" ] || [ -n "$CONTINUOUS_INTEGRATION" ]; then
  exit 0
fi

branchguard check "$1" "$2" || exit 1
"#;

/// Who, if anyone, owns the hook file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    NotInstalled,
    /// A hook file exists but was written by something else.
    InstalledForeign,
    InstalledByGuard,
}

/// Installs, detects and removes the guard hook.
pub struct HookManager {
    hook_path: PathBuf,
}

impl HookManager {
    pub fn new(git_dir: &Path) -> Self {
        Self {
            hook_path: git_dir.join("hooks").join("pre-checkout"),
        }
    }

    /// Location of the hook file.
    pub fn hook_path(&self) -> &Path {
        &self.hook_path
    }

    /// Current ownership state of the hook file.
    pub fn state(&self) -> HookState {
        match fs::read_to_string(&self.hook_path) {
            Ok(content) if content.contains(MARKER) => HookState::InstalledByGuard,
            Ok(_) => HookState::InstalledForeign,
            Err(_) => HookState::NotInstalled,
        }
    }

    /// Whether the guard's own hook is in place.
    pub fn is_installed(&self) -> bool {
        self.state() == HookState::InstalledByGuard
    }

    /// Install the guard hook.
    ///
    /// Idempotent when our hook is already present. A foreign hook is never
    /// overwritten unless `force` is given.
    ///
    /// # Errors
    /// Returns an error for a foreign hook without `force`, or if the file
    /// cannot be written.
    pub fn install(&self, force: bool) -> Result<()> {
        match self.state() {
            HookState::InstalledByGuard if !force => return Ok(()),
            HookState::InstalledForeign if !force => bail!(
                "another pre-checkout hook already exists at {}; re-run with --force to overwrite it",
                self.hook_path.display()
            ),
            _ => {}
        }
        self.write_script()
    }

    /// Remove the guard hook.
    ///
    /// The file is deleted only when stripping the guard script leaves no
    /// meaningful content; a hook carrying foreign lines is left untouched.
    /// Safe to call when no hook exists.
    ///
    /// # Errors
    /// Returns an error if a guard-owned file cannot be deleted.
    pub fn uninstall(&self) -> Result<()> {
        let content = match fs::read_to_string(&self.hook_path) {
            Ok(content) => content,
            Err(_) => return Ok(()),
        };
        if !content.contains(MARKER) {
            return Ok(());
        }

        let residue = content.replace(HOOK_SCRIPT, "");
        let has_foreign_lines = residue.lines().any(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });
        if has_foreign_lines {
            return Ok(());
        }

        fs::remove_file(&self.hook_path)
            .with_context(|| format!("failed to remove {}", self.hook_path.display()))
    }

    fn write_script(&self) -> Result<()> {
        if let Some(dir) = self.hook_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        fs::write(&self.hook_path, HOOK_SCRIPT)
            .with_context(|| format!("failed to write {}", self.hook_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.hook_path, fs::Permissions::from_mode(0o755))
                .context("failed to mark hook executable")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn install_writes_marked_executable_script() {
        let td = tempdir().unwrap();
        let hooks = HookManager::new(td.path());

        hooks.install(false).unwrap();

        let content = fs::read_to_string(hooks.hook_path()).unwrap();
        assert!(content.contains(MARKER));
        assert!(content.contains("BRANCHGUARD_BYPASS"));
        assert!(content.contains("CONTINUOUS_INTEGRATION"));
        assert!(content.contains("check \"$1\" \"$2\""));
        assert!(hooks.is_installed());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(hooks.hook_path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn install_is_idempotent_over_own_hook() {
        let td = tempdir().unwrap();
        let hooks = HookManager::new(td.path());

        hooks.install(false).unwrap();
        let first = fs::read(hooks.hook_path()).unwrap();

        hooks.install(false).unwrap();
        let second = fs::read(hooks.hook_path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn install_refuses_to_overwrite_foreign_hook() {
        let td = tempdir().unwrap();
        let hooks = HookManager::new(td.path());
        fs::create_dir_all(hooks.hook_path().parent().unwrap()).unwrap();
        let foreign = "#!/bin/sh\necho custom hook\n";
        fs::write(hooks.hook_path(), foreign).unwrap();

        let err = hooks.install(false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(fs::read_to_string(hooks.hook_path()).unwrap(), foreign);
        assert_eq!(hooks.state(), HookState::InstalledForeign);
    }

    #[test]
    fn forced_install_overwrites_foreign_hook() {
        let td = tempdir().unwrap();
        let hooks = HookManager::new(td.path());
        fs::create_dir_all(hooks.hook_path().parent().unwrap()).unwrap();
        fs::write(hooks.hook_path(), "#!/bin/sh\necho custom hook\n").unwrap();

        hooks.install(true).unwrap();
        assert!(hooks.is_installed());
    }

    #[test]
    fn uninstall_removes_guard_owned_file() {
        let td = tempdir().unwrap();
        let hooks = HookManager::new(td.path());

        hooks.install(false).unwrap();
        hooks.uninstall().unwrap();

        assert!(!hooks.hook_path().exists());
        assert_eq!(hooks.state(), HookState::NotInstalled);
    }

    #[test]
    fn uninstall_leaves_foreign_content_alone() {
        let td = tempdir().unwrap();
        let hooks = HookManager::new(td.path());
        fs::create_dir_all(hooks.hook_path().parent().unwrap()).unwrap();

        let mixed = format!("{HOOK_SCRIPT}\n./run-other-checks.sh\n");
        fs::write(hooks.hook_path(), &mixed).unwrap();

        hooks.uninstall().unwrap();
        assert_eq!(fs::read_to_string(hooks.hook_path()).unwrap(), mixed);

        let foreign = "#!/bin/sh\necho custom hook\n";
        fs::write(hooks.hook_path(), foreign).unwrap();
        hooks.uninstall().unwrap();
        assert_eq!(fs::read_to_string(hooks.hook_path()).unwrap(), foreign);
    }

    #[test]
    fn uninstall_without_hook_is_a_noop() {
        let td = tempdir().unwrap();
        let hooks = HookManager::new(td.path());
        hooks.uninstall().unwrap();
    }
}
