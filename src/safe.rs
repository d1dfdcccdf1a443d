use anyhow::Result;
use colored::Colorize;

use crate::check::DivergenceChecker;
use crate::config::ConfigStore;
use crate::git::{GitRepo, Vcs};
use crate::progress::Spinner;

/// CLI command: report whether switching to `target` would be safe.
///
/// Unlike the hook-driven `check`, this is an explicit advisory query and
/// fails closed: an unresolvable current branch or a failed divergence
/// computation is reported as an error (exit 1) instead of being waved
/// through.
pub fn cmd_safe(target: &str) -> Result<u8> {
    let spin = Spinner::start("Analyzing branch divergence...");

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

    let divergence = match DivergenceChecker::new(&repo).check(&current, target) {
        Ok(divergence) => divergence,
        Err(e) => {
            spin.warn(format!("Could not check {target}"));
            eprintln!("{}", format!("{e:#}").red());
            return Ok(1);
        }
    };

    spin.stop();

    println!();
    println!("  Current branch: {}", current.cyan());
    println!("  Target branch:  {}", target.cyan());
    println!();

    if divergence.total <= config.threshold as usize {
        println!("{} SAFE to switch", "✔".green());
        println!(
            "  Divergence: {} commits (threshold: {})",
            divergence.total.to_string().green(),
            config.threshold
        );
        println!(
            "{}",
            format!("  Behind: {} | Ahead: {}", divergence.behind, divergence.ahead).dimmed()
        );
    } else {
        println!("{} UNSAFE to switch", "✘".red());
        println!(
            "  Divergence: {} commits (threshold: {})",
            divergence.total.to_string().red(),
            config.threshold
        );
        println!(
            "{}",
            format!("  Behind: {} | Ahead: {}", divergence.behind, divergence.ahead).dimmed()
        );
        println!();
        println!("{}", "What to do?".yellow());
        println!("  {} Run \"branchguard sync\"", ">".cyan());
        println!("{}", "    Or rebase manually".dimmed());
    }
    println!();

    Ok(0)
}
