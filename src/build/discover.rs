//! Post discovery: one `<dir>/index.md` per post.

use jwalk::WalkDir;
use std::path::{Path, PathBuf};

/// File name of a post source inside its directory.
pub const POST_FILE: &str = "index.md";

/// A discovered post source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PostSource {
    /// Post directory (base for relative images).
    pub dir: PathBuf,
    /// The `index.md` inside `dir`.
    pub file: PathBuf,
}

/// Find every `<dir>/index.md` below `root`, sorted by path.
///
/// A missing root yields an empty list. An `index.md` directly in `root` is
/// not a post.
pub fn discover(root: &Path) -> Vec<PostSource> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut sources: Vec<_> = WalkDir::new(root)
        .skip_hidden(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name().to_str() == Some(POST_FILE))
        .map(|e| e.path())
        .filter_map(|file| {
            let dir = file.parent()?.to_path_buf();
            (dir != root).then_some(PostSource { dir, file })
        })
        .collect();

    sources.sort();
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for name in ["zeta", "alpha", "nested/beta"] {
            fs::create_dir_all(root.join(name)).unwrap();
            fs::write(root.join(name).join(POST_FILE), "---\n---\n").unwrap();
        }
        fs::write(root.join("alpha").join("notes.md"), "").unwrap();
        fs::write(root.join(POST_FILE), "").unwrap();
        fs::create_dir_all(root.join(".draft")).unwrap();
        fs::write(root.join(".draft").join(POST_FILE), "").unwrap();

        let found: Vec<_> = discover(root)
            .into_iter()
            .map(|s| s.dir.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            found,
            vec![
                PathBuf::from("alpha"),
                PathBuf::from("nested/beta"),
                PathBuf::from("zeta")
            ]
        );
    }

    #[test]
    fn test_missing_root() {
        assert!(discover(Path::new("/definitely/not/here")).is_empty());
    }
}
