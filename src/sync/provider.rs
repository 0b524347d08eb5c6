//! Vcs trait - Abstraction cho version-control backend.
//!
//! Orchestrator chỉ phụ thuộc vào các operations dưới đây; backend thật là
//! [`GitCli`](super::git::GitCli), chạy `git` như một subprocess.

use crate::error::Result;
use std::path::Path;

/// Kết quả của bước pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// Có commits mới từ remote
    Updated,
    /// Local đã up-to-date
    UpToDate,
    /// Remote chưa có branch này (repo mới, empty)
    RemoteBranchMissing,
}

/// Các operations mà sync orchestrator cần từ version-control tool.
pub trait Vcs {
    /// Thư mục làm việc (vault)
    fn workdir(&self) -> &Path;

    /// Vault đã có repository metadata chưa
    fn is_repository(&self) -> bool;

    /// Khởi tạo repository mới với `branch` là initial branch
    fn init(&self, branch: &str) -> Result<()>;

    /// Đảm bảo remote `name` tồn tại và trỏ đến `url`
    fn ensure_remote(&self, name: &str, url: &str) -> Result<()>;

    /// Đảm bảo đang đứng trên `branch` (tạo mới nếu chưa có)
    fn ensure_branch(&self, branch: &str) -> Result<()>;

    /// Bỏ file khỏi index nhưng giữ nguyên trên đĩa
    fn untrack(&self, path: &str) -> Result<()>;

    /// Stage tất cả changes: thêm, sửa, xóa
    fn stage_all(&self) -> Result<()>;

    /// Pull từ remote; conflict trả về `SyncError::PullConflict`
    fn pull(&self, remote: &str, branch: &str) -> Result<PullOutcome>;

    /// Index có khác HEAD không
    fn has_staged_changes(&self) -> Result<bool>;

    /// Branch hiện tại đã có commit nào chưa
    fn has_commits(&self) -> Result<bool>;

    fn commit(&self, message: &str) -> Result<()>;

    fn push(&self, remote: &str, branch: &str) -> Result<()>;
}
