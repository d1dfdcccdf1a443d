use anyhow::Result;
use colored::Colorize;

use crate::check::BYPASS_ENV;
use crate::config::ConfigStore;
use crate::git::GitRepo;
use crate::hook::HookManager;
use crate::progress::Spinner;

/// CLI command: install the guard hook and persist the configuration.
///
/// Must run inside a git repository. An existing foreign pre-checkout hook
/// is a hard failure unless `force` is given; the persisted document keeps
/// any fields init does not touch (only `threshold` and `enabled` are
/// written).
pub fn cmd_init(force: bool, threshold: u32) -> Result<u8> {
    let spin = Spinner::start("Initializing branchguard...");

    let repo = match GitRepo::discover() {
        Ok(repo) => repo,
        Err(_) => {
            spin.fail("Not a git repository");
            eprintln!("{}", "Run this command inside a git repository".red());
            return Ok(1);
        }
    };

    let hooks = HookManager::new(&repo.git_dir());
    if let Err(e) = hooks.install(force) {
        spin.fail("Failed to install hook");
        eprintln!("{}", format!("{e:#}").red());
        return Ok(1);
    }

    let store = ConfigStore::new(&repo.git_dir());
    let mut config = store.load();
    config.threshold = threshold;
    config.enabled = true;
    if let Err(e) = store.save(&config) {
        spin.fail("Failed to save configuration");
        eprintln!("{}", format!("{e:#}").red());
        return Ok(1);
    }

    spin.succeed("branchguard initialized");
    println!();
    println!("  {} Pre-checkout hook installed", "✔".green());
    println!(
        "  {} Divergence threshold set to {} commits",
        "✔".green(),
        threshold
    );
    println!();
    println!(
        "{}",
        "Your repository is now protected from risky branch switches.".dimmed()
    );
    println!(
        "{}",
        format!("To bypass protection: {BYPASS_ENV}=1 git checkout <branch>").dimmed()
    );

    Ok(0)
}
