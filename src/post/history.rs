//! Last-modified dates from version control.

use std::path::Path;

use crate::utils::exec::Cmd;

/// Source of a post's last modification date (`YYYY-MM-DD`).
///
/// `None` means unknown; the caller falls back to the authored date.
pub trait ModifiedDate: Send + Sync {
    fn last_modified(&self, path: &Path) -> Option<String>;
}

/// Commit date of the last commit touching the file.
///
/// Runs `git log -1 --format=%cs -- <file>` in the file's directory. Any
/// failure (no git, not a repository, untracked file) yields `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitHistory;

impl ModifiedDate for GitHistory {
    fn last_modified(&self, path: &Path) -> Option<String> {
        let dir = path.parent().filter(|d| !d.as_os_str().is_empty())?;
        let file = path.file_name()?;

        match Cmd::new("git")
            .args(["log", "-1", "--format=%cs", "--"])
            .args([file])
            .cwd(dir)
            .read()
        {
            Ok(date) if !date.is_empty() => Some(date),
            Ok(_) => None,
            Err(err) => {
                crate::debug!("history"; "{}: {err:#}", path.display());
                None
            }
        }
    }
}

/// Never knows a date. For local previews and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

impl ModifiedDate for NoHistory {
    fn last_modified(&self, _path: &Path) -> Option<String> {
        None
    }
}
