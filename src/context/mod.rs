//! Repository Context
//!
//! Reads a local repository into the immutable `RepositoryContext` consumed
//! by the quality analyzer and the content pipeline: file tree, declared
//! dependencies, README text and URL-derived metadata.

mod dependencies;
mod scanner;

pub use dependencies::DependencyExtractor;
pub use scanner::FileScanner;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::types::{ForgeError, Result};

// =============================================================================
// Repository Metadata
// =============================================================================

/// Metadata derived from the repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    /// Host domain, e.g. "github.com"
    pub host_domain: String,
    /// Short host name, e.g. "github"
    pub host: String,
    /// Repository name, e.g. "readmeforge"
    pub name: String,
    /// Owner/name path, e.g. "owner/readmeforge"
    pub full_name: String,
}

impl RepoMetadata {
    /// Parse repository metadata from an http(s) URL.
    pub fn from_url(repo_url: &str) -> Result<Self> {
        let parsed = Url::parse(repo_url)
            .map_err(|e| ForgeError::Config(format!("Invalid repository URL: {}", e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ForgeError::Config(format!(
                "Unknown scheme provided: {}",
                parsed.scheme()
            )));
        }

        let host_domain = parsed
            .host_str()
            .ok_or_else(|| ForgeError::Config(format!("Invalid repository URL: {}", repo_url)))?
            .to_string();
        let host = host_domain
            .split('.')
            .next()
            .unwrap_or(&host_domain)
            .to_lowercase();

        let path_parts: Vec<&str> = parsed
            .path()
            .trim_matches('/')
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();
        if path_parts.is_empty() {
            return Err(ForgeError::Config(format!(
                "Repository URL has no path: {}",
                repo_url
            )));
        }

        let full_name = path_parts
            .iter()
            .take(2)
            .map(|p| p.trim_end_matches(".git"))
            .collect::<Vec<_>>()
            .join("/");
        let name = path_parts
            .last()
            .map(|n| n.trim_end_matches(".git").to_string())
            .unwrap_or_default();

        Ok(Self {
            host_domain,
            host,
            name,
            full_name,
        })
    }

    /// Metadata for a repository without a configured URL: the directory
    /// name stands in for the project name.
    pub fn local(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string();
        Self {
            host_domain: "local".to_string(),
            host: "local".to_string(),
            full_name: name.clone(),
            name,
        }
    }
}

// =============================================================================
// Repository Context
// =============================================================================

/// Immutable snapshot of a repository for one pipeline run.
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    /// Repository URL, when configured
    pub repo_url: Option<String>,
    /// Local repository path
    pub local_path: PathBuf,
    /// Newline-joined file tree of relative paths
    pub tree: String,
    /// Declared dependency names (lowercase)
    pub dependencies: BTreeSet<String>,
    /// Existing README content, if any
    pub readme: Option<String>,
    /// URL-derived metadata
    pub metadata: RepoMetadata,
}

impl RepositoryContext {
    /// Read a repository at `path` into a context snapshot.
    pub fn read(config: &Config, path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(ForgeError::Config(format!(
                "Repository path does not exist: {}",
                path.display()
            )));
        }

        let tree = FileScanner::new(path)
            .with_exclude(config.scan.exclude.clone())
            .with_max_file_size(config.scan.max_file_size as u64)
            .tree()?;
        debug!("Scanned {} tree entries", tree.lines().count());

        let dependencies = DependencyExtractor::new(&tree, path).extract();

        let metadata = match &config.git.repository {
            Some(url) => RepoMetadata::from_url(url)?,
            None => RepoMetadata::local(path),
        };

        let readme = extract_readme_content(path);

        info!(
            "Repository context ready: {} ({} files, {} dependencies)",
            metadata.name,
            tree.lines().count(),
            dependencies.len()
        );

        Ok(Self {
            repo_url: config.git.repository.clone(),
            local_path: path.to_path_buf(),
            tree,
            dependencies,
            readme,
            metadata,
        })
    }

    /// Repository identifier for logging: URL when known, else local path.
    pub fn identifier(&self) -> String {
        self.repo_url
            .clone()
            .unwrap_or_else(|| self.local_path.display().to_string())
    }

    /// Check whether a relative path exists in the scanned tree.
    pub fn tree_contains(&self, relative: &str) -> bool {
        self.tree.lines().any(|line| line == relative)
    }
}

/// Extract the content of the repository's README, checking README.md then
/// README.rst.
fn extract_readme_content(repo_path: &Path) -> Option<String> {
    for file in ["README.md", "README.rst"] {
        let readme_path = repo_path.join(file);
        if readme_path.exists() {
            match fs::read_to_string(&readme_path) {
                Ok(content) => return Some(content),
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", readme_path.display(), e);
                }
            }
        }
    }
    None
}
