//! CLI definitions và command implementations cho obsidian-sync.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// obsync - Sync your Obsidian vault with a Git remote
#[derive(Parser)]
#[command(name = "obsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (default: <config dir>/obsidian-sync/config.toml)
    #[arg(long, global = true, env = "OBSIDIAN_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save vault path and remote URL, then prepare the vault repository
    Setup {
        /// Path to your Obsidian vault
        #[arg(short = 'v', long)]
        vault_path: PathBuf,

        /// Remote Git repository URL
        #[arg(short = 'r', long)]
        repo_url: String,

        /// Branch to sync
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Name of the git remote
        #[arg(long, default_value = "origin")]
        remote_name: String,
    },

    /// Pull remote changes, commit local changes and push
    Sync {
        /// Custom commit message (default: "Sync: <timestamp>")
        #[arg(short, long)]
        message: Option<String>,
    },
}
