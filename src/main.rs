//! obsync - Đồng bộ Obsidian vault với remote Git repository.
//!
//! Usage:
//!   obsync setup --vault-path <path> --repo-url <url>
//!   obsync sync [--message <text>]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use obsidian_sync::config::default_config_path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Status cho user đi qua stdout; log chỉ hiện khi --verbose hoặc RUST_LOG
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("obsidian_sync={}", log_level).parse()?)
                .add_directive(format!("obsync={}", log_level).parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Setup {
            vault_path,
            repo_url,
            branch,
            remote_name,
        } => {
            cli::commands::setup(&config_path, &vault_path, &repo_url, &branch, &remote_name)?;
        }
        Commands::Sync { message } => {
            cli::commands::sync_vault(&config_path, message.as_deref())?;
        }
    }

    Ok(())
}
