//! Branch and dirty-state lookup for the `Git:` segment.

use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    pub branch: String,
    pub dirty: bool,
}

impl GitInfo {
    pub fn label(&self) -> String {
        if self.dirty {
            format!("{}*", self.branch)
        } else {
            self.branch.clone()
        }
    }
}

/// Returns `None` when `dir` is not inside a work tree or git is unavailable.
pub fn git_info(dir: &Path) -> Option<GitInfo> {
    let branch_output = Command::new("git")
        .current_dir(dir)
        .args(["branch", "--show-current"])
        .output()
        .ok()?;
    if !branch_output.status.success() {
        return None;
    }

    let branch = String::from_utf8_lossy(&branch_output.stdout)
        .trim()
        .to_string();
    let branch = if branch.is_empty() {
        "detached".to_string()
    } else {
        branch
    };

    let dirty = Command::new("git")
        .current_dir(dir)
        .args(["status", "--porcelain"])
        .output()
        .map(|o| o.status.success() && !o.stdout.iter().all(u8::is_ascii_whitespace))
        .unwrap_or(false);

    Some(GitInfo { branch, dirty })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_label_marks_dirty_tree() {
        let clean = GitInfo {
            branch: "main".to_string(),
            dirty: false,
        };
        let dirty = GitInfo {
            branch: "main".to_string(),
            dirty: true,
        };
        assert_eq!(clean.label(), "main");
        assert_eq!(dirty.label(), "main*");
    }

    #[test]
    fn test_plain_directory_has_no_git_info() {
        let dir = tempdir().unwrap();
        assert_eq!(git_info(dir.path()), None);
    }
}
