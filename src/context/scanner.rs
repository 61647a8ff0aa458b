//! Repository File Scanner
//!
//! Walks a repository and produces the file tree consumed by the quality
//! analyzer and the content pipeline: an ordered, newline-joined listing of
//! relative paths, excluding VCS metadata and non-text artifacts.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::types::Result;

/// Default maximum file size included in the tree (1MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Extensions excluded from the tree: images, video, data dumps, archives,
/// binaries and rendered documents carry no signal for README generation.
const EXCLUDED_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp", "drawio", // videos
    "mp4", "mov", "avi", "mkv", "flv", "wmv", "webm", // data files
    "csv", "tsv", "parquet", "xls", "xlsx", // archives
    "zip", "tar", "gz", "bz2", "7z", // binaries
    "exe", "dll", "so", "bin", "obj", "class", // documents
    "pdf",
];

/// Default directories to skip
const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    "target",
    ".git",
    "build",
    "dist",
    "__pycache__",
    "vendor",
    ".venv",
];

pub struct FileScanner {
    root: PathBuf,
    exclude: Vec<String>,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let exclude = DEFAULT_SKIP_DIRS
            .iter()
            .map(|d| format!("{}/**", d))
            .collect();
        Self {
            root: root.as_ref().to_path_buf(),
            exclude,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Build the newline-joined file tree of relative paths, sorted.
    pub fn tree(&self) -> Result<String> {
        Ok(self.paths()?.join("\n"))
    }

    /// Collect relative paths as sorted strings.
    pub fn paths(&self) -> Result<Vec<String>> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false) // Security: prevent symlink traversal attacks
            .build();

        let mut paths = Vec::new();
        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            if self.should_exclude(path) || !self.check_size(path) || Self::is_excluded_ext(path) {
                continue;
            }

            if let Ok(rel) = path.strip_prefix(&self.root) {
                paths.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn should_exclude(&self, path: &Path) -> bool {
        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => return false,
        };

        // `.git` is never part of the tree, even when not in the exclude list
        if rel.starts_with(".git/") || rel == ".git" {
            return true;
        }

        self.exclude.iter().any(|pattern| {
            let prefix = pattern.trim_end_matches("/**");
            rel == prefix || rel.starts_with(&format!("{}/", prefix))
        })
    }

    fn check_size(&self, path: &Path) -> bool {
        path.metadata()
            .map(|m| m.len() <= self.max_file_size)
            .unwrap_or(false)
    }

    fn is_excluded_ext(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| EXCLUDED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_tree_sorted_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/main.rs");
        touch(dir.path(), "README.md");
        touch(dir.path(), "LICENSE");

        let tree = FileScanner::new(dir.path()).tree().unwrap();
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines, vec!["LICENSE", "README.md", "src/main.rs"]);
    }

    #[test]
    fn test_git_dir_excluded() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".git/HEAD");
        touch(dir.path(), "src/lib.rs");

        let paths = FileScanner::new(dir.path()).paths().unwrap();
        assert_eq!(paths, vec!["src/lib.rs"]);
    }

    #[test]
    fn test_binary_extensions_excluded() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "logo.png");
        touch(dir.path(), "data.csv");
        touch(dir.path(), "main.py");

        let paths = FileScanner::new(dir.path()).paths().unwrap();
        assert_eq!(paths, vec!["main.py"]);
    }

    #[test]
    fn test_skip_dirs_excluded() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "node_modules/pkg/index.js");
        touch(dir.path(), "app.js");

        let paths = FileScanner::new(dir.path()).paths().unwrap();
        assert_eq!(paths, vec!["app.js"]);
    }
}
