//! obsidian-sync
//!
//! Đồng bộ một Obsidian vault với remote Git repository:
//! - Lưu vault path và remote URL vào config file (TOML)
//! - Init repository nếu chưa có, pull trước rồi commit và push
//!
//! Mọi thao tác version-control đều được giao cho `git` binary.

pub mod config;
pub mod error;
pub mod sync;

// Re-export main types
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use sync::{CommitMessage, GitCli, Orchestrator, PullOutcome, SyncReport, SyncStep, Vcs};
