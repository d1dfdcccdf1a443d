use anyhow::Result;
use colored::Colorize;

use crate::config::ConfigStore;
use crate::git::{GitRepo, Vcs, is_repository};
use crate::hook::HookManager;

fn yes_no(value: bool) -> String {
    if value {
        format!("{} yes", "✔".green())
    } else {
        format!("{} no", "✘".red())
    }
}

/// CLI command: read-only report of repository, hook and config state.
///
/// Mutates nothing and always exits 0; an absent repository is part of the
/// report, not an error.
pub fn cmd_status() -> Result<u8> {
    println!();
    println!("{}", "branchguard status".bold());
    println!();

    if !is_repository() {
        println!("Repository:");
        println!("  Git repository: {}", yes_no(false));
        println!();
        println!(
            "{}",
            "Run branchguard inside a git repository to see protection state.".dimmed()
        );
        return Ok(0);
    }

    let repo = match GitRepo::discover() {
        Ok(repo) => repo,
        Err(e) => {
            // Discoverable but unusable, e.g. a bare repository.
            println!("Repository:");
            println!("  Git repository: {}", yes_no(true));
            println!("  {}", format!("{e:#}").dimmed());
            println!();
            return Ok(0);
        }
    };
    let hooks = HookManager::new(&repo.git_dir());
    let store = ConfigStore::new(&repo.git_dir());
    let config = store.load();
    let hook_installed = hooks.is_installed();

    println!("Repository:");
    println!("  Git repository: {}", yes_no(true));
    if let Some(branch) = repo.current_branch() {
        println!("  Current branch: {}", branch.cyan());
    }
    println!();

    println!("Protection:");
    println!("  Hook installed: {}", yes_no(hook_installed));
    println!("  Enabled:        {}", yes_no(config.enabled));
    println!();

    println!("Configuration:");
    println!("  Threshold:   {} commits", config.threshold);
    println!("  Base branch: {}", config.base_branch);
    println!("  Config file: {}", store.path().display());
    println!();

    if !hook_installed {
        println!(
            "{}",
            "⚠ Hook not installed. Run \"branchguard init\" to enable protection.".yellow()
        );
    } else if !config.enabled {
        println!("{}", "⚠ Protection is disabled.".yellow());
    } else {
        println!("{}", "✔ Your repository is protected".green());
    }
    println!();

    Ok(0)
}
