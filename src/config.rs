//! Config module - Quản lý cấu hình obsidian-sync (config.toml).
//!
//! File cấu hình chứa:
//! - Đường dẫn tuyệt đối đến vault
//! - URL của remote repository
//! - Tên remote và branch dùng để sync

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Biến môi trường để override đường dẫn config
pub const CONFIG_ENV: &str = "OBSIDIAN_SYNC_CONFIG";

/// Cấu hình sync giữa vault và remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Phiên bản config (để migrate trong tương lai)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Đường dẫn tuyệt đối đến vault directory
    pub vault_path: PathBuf,

    /// URL của remote repository
    pub remote_url: String,

    #[serde(default = "default_remote_name")]
    pub remote_name: String,

    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_version() -> u32 {
    1
}

fn default_remote_name() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

/// Lấy đường dẫn config directory mặc định (~/.config/obsidian-sync/)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("obsidian-sync"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Lấy đường dẫn config file mặc định
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

impl SyncConfig {
    /// Tạo config mới từ input của user.
    ///
    /// Vault path phải tồn tại và là thư mục; được chuyển thành đường dẫn
    /// tuyệt đối để các lần sync sau không phụ thuộc vào working directory.
    pub fn new(vault_path: &Path, remote_url: &str) -> Result<Self> {
        let remote_url = remote_url.trim();
        if remote_url.is_empty() {
            return Err(SyncError::InvalidRemoteUrl);
        }

        if !vault_path.is_dir() {
            return Err(SyncError::InvalidVaultPath(vault_path.to_path_buf()));
        }
        let vault_path = vault_path
            .canonicalize()
            .map_err(|_| SyncError::InvalidVaultPath(vault_path.to_path_buf()))?;

        Ok(Self {
            version: default_version(),
            vault_path,
            remote_url: remote_url.to_string(),
            remote_name: default_remote_name(),
            branch: default_branch(),
        })
    }

    /// Đổi branch dùng để sync
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Đổi tên remote
    pub fn with_remote_name(mut self, remote_name: impl Into<String>) -> Self {
        self.remote_name = remote_name.into();
        self
    }

    /// Kiểm tra lại invariant trước mỗi lần sync
    pub fn validate(&self) -> Result<()> {
        if self.remote_url.trim().is_empty() {
            return Err(SyncError::InvalidRemoteUrl);
        }
        if self.vault_path.as_os_str().is_empty() || !self.vault_path.is_dir() {
            return Err(SyncError::InvalidVaultPath(self.vault_path.clone()));
        }
        Ok(())
    }

    /// Load config từ file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SyncError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SyncError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Lưu config ra file (ghi đè nội dung cũ)
    pub fn save(&self, path: &Path) -> Result<()> {
        // Tạo thư mục cha nếu chưa tồn tại
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| SyncError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }
}
