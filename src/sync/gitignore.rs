//! Quản lý .gitignore của vault.
//!
//! Obsidian ghi lại layout của từng thiết bị vào `.obsidian/workspace*.json`;
//! các file này thay đổi liên tục và gây conflict giữa các máy nên không
//! được đưa vào history.

use crate::error::Result;
use std::path::Path;

/// Các file local-only của Obsidian
pub const IGNORED_PATHS: &[&str] = &[
    ".obsidian/workspace.json",
    ".obsidian/workspace-mobile.json",
];

/// Thêm các entry còn thiếu vào `.gitignore`, giữ nguyên nội dung sẵn có.
/// Trả về true nếu file bị thay đổi.
pub fn ensure_entries(vault_dir: &Path, entries: &[&str]) -> Result<bool> {
    let path = vault_dir.join(".gitignore");
    let content = if path.exists() {
        std::fs::read_to_string(&path)?
    } else {
        String::new()
    };

    let missing: Vec<&str> = entries
        .iter()
        .copied()
        .filter(|entry| !content.lines().any(|line| line.trim() == *entry))
        .collect();

    if missing.is_empty() {
        return Ok(false);
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    for entry in &missing {
        updated.push_str(entry);
        updated.push('\n');
    }

    std::fs::write(&path, updated)?;
    tracing::info!(path = %path.display(), added = ?missing, "updated .gitignore");
    Ok(true)
}
