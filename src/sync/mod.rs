//! Sync module - Đồng bộ vault với remote qua Git.
//!
//! Module này chứa:
//! - Vcs trait và Git backend chạy qua command line
//! - Quản lý .gitignore cho các file local-only của Obsidian
//! - Orchestrator: prepare -> stage -> pull -> commit -> push

pub mod git;
pub mod gitignore;
pub mod orchestrator;
pub mod provider;

pub use git::GitCli;
pub use orchestrator::{CommitMessage, Orchestrator, SyncReport, SyncStep};
pub use provider::{PullOutcome, Vcs};
