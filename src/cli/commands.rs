//! Command implementations cho obsync CLI.
//!
//! Các commands chính:
//! - setup: Lưu config và chuẩn bị repository trong vault
//! - sync: Stage, pull, commit và push (all-in-one)

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use obsidian_sync::{Orchestrator, PullOutcome, SyncConfig, SyncReport};
use std::path::Path;
use std::time::Duration;

/// Lưu config và chuẩn bị repository (init, remote, branch, .gitignore)
pub fn setup(
    config_path: &Path,
    vault_path: &Path,
    repo_url: &str,
    branch: &str,
    remote_name: &str,
) -> Result<()> {
    println!("{}", "Setting up vault sync...".cyan().bold());

    let config = SyncConfig::new(vault_path, repo_url)?
        .with_branch(branch)
        .with_remote_name(remote_name);

    config
        .save(config_path)
        .with_context(|| format!("Cannot write config file: {}", config_path.display()))?;
    println!(
        "  {} Config saved: {}",
        "✓".green(),
        config_path.display().to_string().dimmed()
    );

    let vault_display = config.vault_path.display().to_string();
    let remote_display = format!("{} -> {}", config.remote_name, config.remote_url);

    let orchestrator = Orchestrator::with_git(config);
    let initialized = orchestrator
        .prepare()
        .context("Cannot prepare vault repository")?;

    if initialized {
        println!(
            "  {} Initialized git repository in {}",
            "✓".green(),
            vault_display
        );
    } else {
        println!("  {} Using existing repository in {}", "✓".green(), vault_display);
    }
    println!("  {} Remote: {}", "✓".green(), remote_display);

    println!("\n{}", "Setup complete!".green().bold());
    println!("Run {} to synchronize your vault.", "obsync sync".cyan());
    Ok(())
}

/// Đồng bộ vault theo config đã lưu
pub fn sync_vault(config_path: &Path, message: Option<&str>) -> Result<()> {
    let config = SyncConfig::load(config_path)?;

    println!(
        "{} {} {} {}",
        "Syncing".cyan().bold(),
        config.vault_path.display(),
        "with".cyan(),
        config.remote_url
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("  {spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let orchestrator = Orchestrator::with_git(config);
    let result = orchestrator.sync(message, |step| spinner.set_message(format!("{}...", step)));
    spinner.finish_and_clear();

    let report = result.context("Sync failed")?;
    print_report(&report, orchestrator.config());

    println!("\n{}", "Sync complete!".green().bold());
    Ok(())
}

fn print_report(report: &SyncReport, config: &SyncConfig) {
    if report.initialized {
        println!("  {} Initialized git repository", "✓".green());
    }

    match report.pulled {
        PullOutcome::Updated => println!("  {} Pulled remote changes", "✓".green()),
        PullOutcome::UpToDate => println!("  {} Already up to date with remote", "✓".green()),
        PullOutcome::RemoteBranchMissing => println!(
            "  {} Remote branch '{}' does not exist yet",
            "→".cyan(),
            config.branch
        ),
    }

    match &report.committed {
        Some(message) => println!("  {} Committed: {}", "✓".green(), message),
        None => println!("  {}", "No local changes to commit.".yellow()),
    }

    if report.pushed {
        println!(
            "  {} Pushed to {}/{}",
            "✓".green(),
            config.remote_name,
            config.branch
        );
    } else {
        println!("  {}", "Nothing to push yet.".yellow());
    }
}
