use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_enabled() -> bool {
    true
}

fn default_threshold() -> u32 {
    10
}

fn default_base_branch() -> String {
    "main".to_string()
}

/// Guard settings persisted under the repository's metadata directory.
///
/// Every field carries its own serde default, so a partial document is
/// merged over the built-in defaults on read.
///
/// Example TOML:
/// ```toml
/// enabled = true
/// threshold = 10
/// base_branch = "main"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            threshold: default_threshold(),
            base_branch: default_base_branch(),
        }
    }
}

/// Reads and writes the persisted guard configuration.
///
/// The document lives at `<git-dir>/branchguard/config.toml`. A missing or
/// malformed document is never an error on the read side; it degrades to
/// the defaults so a broken config can't take `git checkout` hostage.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(git_dir: &Path) -> Self {
        Self {
            path: git_dir.join("branchguard").join("config.toml"),
        }
    }

    /// Location of the persisted document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, merged over defaults.
    pub fn load(&self) -> GuardConfig {
        let Ok(txt) = fs::read_to_string(&self.path) else {
            return GuardConfig::default();
        };
        toml::from_str(&txt).unwrap_or_default()
    }

    /// Persist the whole configuration document.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, config: &GuardConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let txt = toml::to_string(config).context("failed to serialize config")?;
        fs::write(&self.path, txt)
            .with_context(|| format!("failed to save config: {}", self.path.display()))
    }
}
