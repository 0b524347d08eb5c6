//! Sync orchestrator - chạy một lần sync giữa vault và remote.
//!
//! Thứ tự cố định: prepare (init nếu cần) -> stage -> pull -> commit -> push.
//! Pull chạy trước commit để giảm khả năng push bị từ chối vì local bị
//! behind. Không rollback khi một bước thất bại: commit đã tạo vẫn giữ
//! nguyên nếu push lỗi, chạy lại sync là đủ.

use super::git::GitCli;
use super::gitignore::{self, IGNORED_PATHS};
use super::provider::{PullOutcome, Vcs};
use crate::config::SyncConfig;
use crate::error::Result;
use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use std::fmt;

/// Commit message cho một lần sync: do user nhập hoặc `Sync: <timestamp>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage(String);

impl CommitMessage {
    pub const DEFAULT_PREFIX: &'static str = "Sync: ";

    /// Message của user nếu có (và không rỗng), ngược lại dùng timestamp hiện tại
    pub fn resolve(custom: Option<&str>) -> Self {
        Self::resolve_at(custom, Local::now())
    }

    pub fn resolve_at<Tz: TimeZone>(custom: Option<&str>, now: DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        match custom {
            Some(text) if !text.trim().is_empty() => Self(text.to_string()),
            _ => Self(format!(
                "{}{}",
                Self::DEFAULT_PREFIX,
                now.to_rfc3339_opts(SecondsFormat::Secs, false)
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Các bước của một lần sync, báo cho caller để hiển thị tiến trình
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Prepare,
    Stage,
    Pull,
    Commit,
    Push,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncStep::Prepare => "Preparing repository",
            SyncStep::Stage => "Staging changes",
            SyncStep::Pull => "Pulling from remote",
            SyncStep::Commit => "Committing",
            SyncStep::Push => "Pushing to remote",
        };
        f.write_str(label)
    }
}

/// Kết quả của một lần sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Repository vừa được khởi tạo trong lần chạy này
    pub initialized: bool,
    pub pulled: PullOutcome,
    /// None nếu không có gì để commit
    pub committed: Option<CommitMessage>,
    /// False khi branch chưa có commit nào để push
    pub pushed: bool,
}

/// Điều phối các bước sync trên một [`Vcs`] backend
pub struct Orchestrator<V: Vcs> {
    config: SyncConfig,
    vcs: V,
}

impl Orchestrator<GitCli> {
    /// Orchestrator dùng `git` trong PATH, chạy trong vault của config
    pub fn with_git(config: SyncConfig) -> Self {
        let vcs = GitCli::new(&config.vault_path);
        Self::new(config, vcs)
    }
}

impl<V: Vcs> Orchestrator<V> {
    pub fn new(config: SyncConfig, vcs: V) -> Self {
        Self { config, vcs }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Đảm bảo vault là repository có remote, branch và .gitignore đúng.
    /// Trả về true nếu repository vừa được khởi tạo.
    pub fn prepare(&self) -> Result<bool> {
        let config = &self.config;
        config.validate()?;

        let mut initialized = false;
        if !self.vcs.is_repository() {
            tracing::info!(vault = %config.vault_path.display(), "initializing git repository");
            self.vcs.init(&config.branch)?;
            initialized = true;
        }

        self.vcs
            .ensure_remote(&config.remote_name, &config.remote_url)?;
        self.vcs.ensure_branch(&config.branch)?;

        gitignore::ensure_entries(self.vcs.workdir(), IGNORED_PATHS)?;
        for path in IGNORED_PATHS {
            self.vcs.untrack(path)?;
        }

        Ok(initialized)
    }

    /// Chạy một lần sync đầy đủ. `on_step` được gọi trước mỗi bước.
    pub fn sync<F>(&self, message: Option<&str>, mut on_step: F) -> Result<SyncReport>
    where
        F: FnMut(SyncStep),
    {
        let config = &self.config;

        on_step(SyncStep::Prepare);
        let initialized = self.prepare()?;

        on_step(SyncStep::Stage);
        self.vcs.stage_all()?;

        on_step(SyncStep::Pull);
        let pulled = self.vcs.pull(&config.remote_name, &config.branch)?;
        tracing::info!(?pulled, remote = %config.remote_name, branch = %config.branch, "pulled");

        on_step(SyncStep::Commit);
        // Autostash trả changes về working tree, cần stage lại
        self.vcs.stage_all()?;
        let committed = if self.vcs.has_staged_changes()? {
            let message = CommitMessage::resolve(message);
            self.vcs.commit(message.as_str())?;
            tracing::info!(message = %message, "committed");
            Some(message)
        } else {
            tracing::info!("nothing to commit");
            None
        };

        on_step(SyncStep::Push);
        let pushed = if self.vcs.has_commits()? {
            self.vcs.push(&config.remote_name, &config.branch)?;
            tracing::info!(remote = %config.remote_name, branch = %config.branch, "pushed");
            true
        } else {
            tracing::info!("branch has no commits yet, skipping push");
            false
        };

        Ok(SyncReport {
            initialized,
            pulled,
            committed,
            pushed,
        })
    }
}
