//! Error types cho obsidian-sync.
//!
//! Mọi lỗi đều dừng lần chạy ngay lập tức, kèm theo thông báo chẩn đoán gốc
//! của git (stderr) để user tự xử lý rồi chạy lại.

use std::path::PathBuf;
use thiserror::Error;

/// Lỗi của configuration store và sync orchestrator
#[derive(Debug, Error)]
pub enum SyncError {
    /// Chạy sync khi chưa setup
    #[error("No configuration found at {}. Run `obsync setup` first", .path.display())]
    ConfigMissing { path: PathBuf },

    /// File config tồn tại nhưng không đọc/parse được
    #[error("Invalid configuration file {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    /// Vault path không tồn tại hoặc không phải thư mục
    #[error("Vault path does not exist or is not a directory: {}", .0.display())]
    InvalidVaultPath(PathBuf),

    #[error("Remote repository URL must not be empty")]
    InvalidRemoteUrl,

    /// Không chạy được git binary
    #[error("Cannot execute git: {0}")]
    GitUnavailable(#[source] std::io::Error),

    #[error("Cannot initialize git repository in {}: {stderr}", .path.display())]
    RepoInitFailure { path: PathBuf, stderr: String },

    /// Một git command khác (add, commit, remote, checkout...) thất bại
    #[error("git {command} failed: {stderr}")]
    GitCommand { command: String, stderr: String },

    /// Pull để lại conflict, user cần resolve thủ công
    #[error(
        "Merge conflict while pulling. Nothing was committed or pushed.\n\
         {output}\n\
         Resolve manually:\n  \
         1. cd {}\n  \
         2. Resolve conflicts in affected files (see `git status`)\n  \
         3. Finish or abort the rebase, then restore stashed changes if any\n  \
         4. Run `obsync sync` again",
        .workdir.display()
    )]
    PullConflict { workdir: PathBuf, output: String },

    #[error("Git pull failed: {0}")]
    PullFailure(String),

    /// Push bị từ chối (auth, network, non-fast-forward)
    #[error("Git push failed: {0}")]
    PushFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
