//! Git operations cho obsidian-sync.
//!
//! Mọi operation đều chạy `git` như một subprocess trong vault directory:
//! - Init repository
//! - Cấu hình remote và branch
//! - Stage, commit
//! - Pull (rebase + autostash) và push
//!
//! Chẩn đoán lấy từ exit code và stderr của git.

use super::provider::{PullOutcome, Vcs};
use crate::error::{Result, SyncError};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Identity dùng khi user chưa cấu hình user.name / user.email
const FALLBACK_NAME: &str = "Obsidian Sync";
const FALLBACK_EMAIL: &str = "obsidian-sync@localhost";

/// Git backend chạy qua command line
pub struct GitCli {
    workdir: PathBuf,
    program: PathBuf,
    fallback_identity: OnceCell<bool>,
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            program: PathBuf::from("git"),
            fallback_identity: OnceCell::new(),
        }
    }

    /// Dùng git binary ở đường dẫn khác thay vì `git` trong PATH
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// User đã cấu hình identity chưa; nếu chưa thì commit/stash/rebase
    /// dùng identity mặc định
    fn needs_fallback_identity(&self) -> bool {
        *self.fallback_identity.get_or_init(|| {
            let configured = |key: &str| {
                Command::new(&self.program)
                    .current_dir(&self.workdir)
                    .args(["config", "--get", key])
                    .output()
                    .map(|o| o.status.success() && !stdout_of(&o).is_empty())
                    .unwrap_or(false)
            };
            !(configured("user.name") && configured("user.email"))
        })
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.workdir)
            .args(args)
            // Output tiếng Anh để nhận diện lỗi qua stderr
            .env("LC_ALL", "C");

        if self.needs_fallback_identity() {
            cmd.env("GIT_AUTHOR_NAME", FALLBACK_NAME)
                .env("GIT_AUTHOR_EMAIL", FALLBACK_EMAIL)
                .env("GIT_COMMITTER_NAME", FALLBACK_NAME)
                .env("GIT_COMMITTER_EMAIL", FALLBACK_EMAIL);
        }
        cmd
    }

    /// Chạy git và trả về output thô, kể cả khi exit code khác 0
    fn run(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(workdir = %self.workdir.display(), ?args, "git");
        let output = self
            .command(args)
            .output()
            .map_err(SyncError::GitUnavailable)?;
        tracing::trace!(status = ?output.status.code(), stderr = %stderr_of(&output), "git done");
        Ok(output)
    }

    /// Chạy git, lỗi nếu exit code khác 0; trả về stdout
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(SyncError::GitCommand {
                command: args.join(" "),
                stderr: stderr_of(&output),
            });
        }
        Ok(stdout_of(&output))
    }

    /// Còn file nào đang ở trạng thái unmerged không
    fn has_unmerged_paths(&self) -> Result<bool> {
        let stdout = self.run_checked(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(!stdout.is_empty())
    }

    /// Message của commit tại HEAD
    pub fn head_message(&self) -> Result<String> {
        self.run_checked(&["log", "-1", "--format=%B"])
    }
}

impl Vcs for GitCli {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn is_repository(&self) -> bool {
        // .git có thể là file (worktree, submodule)
        self.workdir.join(".git").exists()
    }

    fn init(&self, branch: &str) -> Result<()> {
        let initial_branch = format!("--initial-branch={}", branch);
        let output = self.run(&["init", "--quiet", &initial_branch])?;
        if !output.status.success() {
            return Err(SyncError::RepoInitFailure {
                path: self.workdir.clone(),
                stderr: stderr_of(&output),
            });
        }
        Ok(())
    }

    fn ensure_remote(&self, name: &str, url: &str) -> Result<()> {
        let output = self.run(&["remote", "get-url", name])?;
        if !output.status.success() {
            self.run_checked(&["remote", "add", name, url])?;
            tracing::info!(remote = name, url, "remote added");
            return Ok(());
        }

        let current = stdout_of(&output);
        if current != url {
            self.run_checked(&["remote", "set-url", name, url])?;
            tracing::info!(remote = name, from = %current, to = url, "remote URL updated");
        }
        Ok(())
    }

    fn ensure_branch(&self, branch: &str) -> Result<()> {
        let output = self.run(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        if output.status.success() && stdout_of(&output) == branch {
            return Ok(());
        }

        let local_ref = format!("refs/heads/{}", branch);
        let exists = self
            .run(&["rev-parse", "--verify", "--quiet", &local_ref])?
            .status
            .success();

        if exists {
            self.run_checked(&["checkout", "--quiet", branch, "--"])?;
        } else {
            self.run_checked(&["checkout", "--quiet", "-b", branch])?;
        }
        tracing::info!(branch, created = !exists, "switched branch");
        Ok(())
    }

    fn untrack(&self, path: &str) -> Result<()> {
        self.run_checked(&["rm", "--cached", "--ignore-unmatch", "--quiet", "--", path])?;
        Ok(())
    }

    /// Sử dụng git add -A để add tất cả files (bao gồm subdirectories và deletions)
    fn stage_all(&self) -> Result<()> {
        self.run_checked(&["add", "-A"])?;
        Ok(())
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<PullOutcome> {
        // git từ chối rebase lên unborn branch khi index có changes,
        // nên branch chưa có commit thì merge thay vì rebase
        let mut args = vec!["pull"];
        if self.has_commits()? {
            args.extend(["--rebase", "--autostash"]);
        } else {
            args.push("--no-rebase");
        }
        args.extend([remote, branch]);
        let output = self.run(&args)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{}\n{}", stdout, stderr).trim().to_string();

        if output.status.success() {
            // Autostash không apply lại được vẫn trả về exit code 0
            if combined.contains("resulted in conflicts") || self.has_unmerged_paths()? {
                return Err(SyncError::PullConflict {
                    workdir: self.workdir.clone(),
                    output: combined,
                });
            }
            if combined.contains("Already up to date")
                || combined.contains("Already up-to-date")
                || combined.contains("is up to date")
            {
                return Ok(PullOutcome::UpToDate);
            }
            return Ok(PullOutcome::Updated);
        }

        // Remote không có branch này (repo mới, empty)
        if stderr.to_lowercase().contains("couldn't find remote ref") {
            return Ok(PullOutcome::RemoteBranchMissing);
        }

        if combined.contains("CONFLICT")
            || combined.contains("Automatic merge failed")
            || combined.contains("could not apply")
            || self.has_unmerged_paths()?
        {
            return Err(SyncError::PullConflict {
                workdir: self.workdir.clone(),
                output: combined,
            });
        }

        Err(SyncError::PullFailure(stderr.trim().to_string()))
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let output = self.run(&["status", "--porcelain"])?;
        if !output.status.success() {
            return Err(SyncError::GitCommand {
                command: "status --porcelain".to_string(),
                stderr: stderr_of(&output),
            });
        }

        // Cột đầu tiên của porcelain format là trạng thái trong index
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter_map(|line| line.chars().next())
            .any(|x| !matches!(x, ' ' | '?' | '!')))
    }

    fn has_commits(&self) -> Result<bool> {
        let output = self.run(&["rev-parse", "--verify", "--quiet", "HEAD"])?;
        Ok(output.status.success())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "--quiet", "-m", message])?;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        let output = self.run(&["push", "--set-upstream", remote, branch])?;
        if !output.status.success() {
            return Err(SyncError::PushFailure(stderr_of(&output)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_bare(path: &Path) -> Result<()> {
        let status = Command::new("git")
            .args(["init", "--quiet", "--bare"])
            .arg(path)
            .status()?;
        assert!(status.success());
        Ok(())
    }

    fn new_vault(temp_dir: &TempDir) -> Result<(PathBuf, GitCli)> {
        let vault_dir = temp_dir.path().join("vault");
        std::fs::create_dir_all(&vault_dir)?;
        let git = GitCli::new(&vault_dir);
        git.init("main")?;
        Ok((vault_dir, git))
    }

    #[test]
    fn test_init_repository() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let vault_dir = temp_dir.path().join("vault");
        std::fs::create_dir_all(&vault_dir)?;

        let git = GitCli::new(&vault_dir);
        assert!(!git.is_repository());

        git.init("main")?;
        assert!(git.is_repository());
        assert!(vault_dir.join(".git").exists());
        assert!(!git.has_commits()?);

        // HEAD trỏ đến main ngay cả khi chưa có commit
        git.ensure_branch("main")?;
        let head = git.run_checked(&["symbolic-ref", "--short", "HEAD"])?;
        assert_eq!(head, "main");

        Ok(())
    }

    #[test]
    fn test_init_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let git = GitCli::new(temp_dir.path().join("missing"));

        // current_dir không tồn tại thì không spawn được process
        let err = git.init("main").unwrap_err();
        assert!(matches!(
            err,
            SyncError::GitUnavailable(_) | SyncError::RepoInitFailure { .. }
        ));
    }

    #[test]
    fn test_unknown_program() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let git = GitCli::new(temp_dir.path()).with_program("definitely-not-git-binary");

        let err = git.stage_all().unwrap_err();
        assert!(matches!(err, SyncError::GitUnavailable(_)));

        Ok(())
    }

    #[test]
    fn test_stage_and_commit() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let (vault_dir, git) = new_vault(&temp_dir)?;

        std::fs::write(vault_dir.join("note.md"), "# Note")?;
        assert!(!git.has_staged_changes()?);

        git.stage_all()?;
        assert!(git.has_staged_changes()?);

        git.commit("Initial commit")?;
        assert!(git.has_commits()?);
        assert!(!git.has_staged_changes()?);
        assert_eq!(git.head_message()?, "Initial commit");

        Ok(())
    }

    #[test]
    fn test_stage_all_includes_deletions() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let (vault_dir, git) = new_vault(&temp_dir)?;

        std::fs::create_dir_all(vault_dir.join("daily"))?;
        std::fs::write(vault_dir.join("daily").join("2026-10-19.md"), "today")?;
        git.stage_all()?;
        git.commit("Add daily note")?;

        std::fs::remove_file(vault_dir.join("daily").join("2026-10-19.md"))?;
        git.stage_all()?;
        assert!(git.has_staged_changes()?);

        Ok(())
    }

    #[test]
    fn test_ensure_remote() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let (_, git) = new_vault(&temp_dir)?;

        git.ensure_remote("origin", "https://github.com/user/notes.git")?;
        assert_eq!(
            git.run_checked(&["remote", "get-url", "origin"])?,
            "https://github.com/user/notes.git"
        );

        // Gọi lại với URL khác thì cập nhật
        git.ensure_remote("origin", "https://github.com/user/other.git")?;
        assert_eq!(
            git.run_checked(&["remote", "get-url", "origin"])?,
            "https://github.com/user/other.git"
        );

        // Idempotent
        git.ensure_remote("origin", "https://github.com/user/other.git")?;

        Ok(())
    }

    #[test]
    fn test_ensure_branch_switches() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let vault_dir = temp_dir.path().join("vault");
        std::fs::create_dir_all(&vault_dir)?;
        let git = GitCli::new(&vault_dir);
        git.init("master")?;

        std::fs::write(vault_dir.join("note.md"), "x")?;
        git.stage_all()?;
        git.commit("On master")?;

        git.ensure_branch("main")?;
        assert_eq!(git.run_checked(&["symbolic-ref", "--short", "HEAD"])?, "main");

        git.ensure_branch("master")?;
        assert_eq!(git.run_checked(&["symbolic-ref", "--short", "HEAD"])?, "master");

        Ok(())
    }

    #[test]
    fn test_untrack_keeps_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let (vault_dir, git) = new_vault(&temp_dir)?;

        let workspace = vault_dir.join(".obsidian").join("workspace.json");
        std::fs::create_dir_all(workspace.parent().unwrap())?;
        std::fs::write(&workspace, "{}")?;
        git.stage_all()?;
        git.commit("Track workspace")?;

        git.untrack(".obsidian/workspace.json")?;
        assert!(workspace.exists());
        assert!(git.has_staged_changes()?);

        // File không được track thì không lỗi
        git.untrack(".obsidian/workspace-mobile.json")?;

        Ok(())
    }

    #[test]
    fn test_pull_missing_remote_branch() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let remote = temp_dir.path().join("remote.git");
        init_bare(&remote)?;

        let (vault_dir, git) = new_vault(&temp_dir)?;
        git.ensure_remote("origin", &remote.to_string_lossy())?;
        std::fs::write(vault_dir.join("note.md"), "x")?;
        git.stage_all()?;

        assert_eq!(git.pull("origin", "main")?, PullOutcome::RemoteBranchMissing);

        Ok(())
    }

    #[test]
    fn test_push_then_pull_up_to_date() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let remote = temp_dir.path().join("remote.git");
        init_bare(&remote)?;

        let (vault_dir, git) = new_vault(&temp_dir)?;
        git.ensure_remote("origin", &remote.to_string_lossy())?;
        std::fs::write(vault_dir.join("note.md"), "x")?;
        git.stage_all()?;
        git.commit("First")?;
        git.push("origin", "main")?;

        assert_eq!(git.pull("origin", "main")?, PullOutcome::UpToDate);

        Ok(())
    }

    #[test]
    fn test_pull_unreachable_remote() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let (_, git) = new_vault(&temp_dir)?;
        let missing = temp_dir.path().join("no-such-remote.git");
        git.ensure_remote("origin", &missing.to_string_lossy())?;

        let err = git.pull("origin", "main").unwrap_err();
        assert!(matches!(err, SyncError::PullFailure(_)), "got {:?}", err);

        Ok(())
    }

    #[test]
    fn test_push_unreachable_remote() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let (vault_dir, git) = new_vault(&temp_dir)?;
        let missing = temp_dir.path().join("no-such-remote.git");
        git.ensure_remote("origin", &missing.to_string_lossy())?;

        std::fs::write(vault_dir.join("note.md"), "x")?;
        git.stage_all()?;
        git.commit("First")?;

        let err = git.push("origin", "main").unwrap_err();
        assert!(matches!(err, SyncError::PushFailure(_)));

        Ok(())
    }
}
