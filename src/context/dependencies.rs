//! Dependency Extraction
//!
//! Extracts declared dependency names from common project manifests:
//! requirements.txt, pyproject.toml, setup.py, Cargo.toml and package.json.
//! The resulting lowercase name set feeds badge generation and prompt context.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

static REQUIREMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([a-zA-Z0-9_\-]+)").expect("valid regex"));

static INSTALL_REQUIRES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"install_requires\s*=\s*\[([^\]]+)\]").expect("valid regex"));

static QUOTED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'([^']+)'|"([^"]+)""#).expect("valid regex"));

/// Extracts technology names from manifest files found in the repository tree.
pub struct DependencyExtractor<'a> {
    tree: &'a str,
    base_path: &'a Path,
}

impl<'a> DependencyExtractor<'a> {
    pub fn new(tree: &'a str, base_path: &'a Path) -> Self {
        Self { tree, base_path }
    }

    /// Extract the set of dependency names declared across all recognized
    /// manifests. Malformed manifests are logged and skipped.
    pub fn extract(&self) -> BTreeSet<String> {
        let mut techs = BTreeSet::new();

        techs.extend(self.from_requirements());
        techs.extend(self.from_pyproject());
        techs.extend(self.from_setup_py());
        techs.extend(self.from_cargo_toml());
        techs.extend(self.from_package_json());

        debug!("Extracted {} dependency names", techs.len());
        techs
    }

    /// Find the first tree entry whose file name matches `name` and return
    /// its absolute path, if the file exists on disk.
    fn find_manifest(&self, name: &str) -> Option<PathBuf> {
        self.tree
            .lines()
            .find(|line| {
                Path::new(line)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n == name)
            })
            .map(|rel| self.base_path.join(rel))
            .filter(|abs| abs.exists())
    }

    fn from_requirements(&self) -> BTreeSet<String> {
        let mut techs = BTreeSet::new();
        let Some(path) = self.find_manifest("requirements.txt") else {
            return techs;
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                for line in content.lines() {
                    if line.trim_start().starts_with('#') {
                        continue;
                    }
                    if let Some(cap) = REQUIREMENT_LINE.captures(line) {
                        techs.insert(cap[1].to_lowercase());
                    }
                }
            }
            Err(e) => warn!("Failed to read {}: {}", path.display(), e),
        }
        techs
    }

    fn from_pyproject(&self) -> BTreeSet<String> {
        let mut techs = BTreeSet::new();
        let Some(path) = self.find_manifest("pyproject.toml") else {
            return techs;
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return techs;
            }
        };

        let data: toml::Value = match content.parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to decode pyproject.toml: {}", e);
                return techs;
            }
        };

        // PEP 621
        if let Some(deps) = data
            .get("project")
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_array())
        {
            for dep in deps.iter().filter_map(|d| d.as_str()) {
                if let Some(name) = dep.split_whitespace().next() {
                    techs.insert(dist_name(name));
                }
            }
        }

        // Poetry
        if let Some(deps) = data
            .get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            techs.extend(deps.keys().map(|name| name.to_lowercase()));
        }

        techs
    }

    fn from_setup_py(&self) -> BTreeSet<String> {
        let mut techs = BTreeSet::new();
        let Some(path) = self.find_manifest("setup.py") else {
            return techs;
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return techs;
            }
        };

        if let Some(list) = INSTALL_REQUIRES.captures(&content) {
            for cap in QUOTED_ITEM.captures_iter(&list[1]) {
                let item = cap.get(1).or_else(|| cap.get(2));
                if let Some(dep) = item
                    && let Some(name) = dep.as_str().split_whitespace().next()
                {
                    techs.insert(dist_name(name));
                }
            }
        }
        techs
    }

    fn from_cargo_toml(&self) -> BTreeSet<String> {
        let mut techs = BTreeSet::new();
        let Some(path) = self.find_manifest("Cargo.toml") else {
            return techs;
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return techs;
            }
        };

        let data: toml::Value = match content.parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to decode Cargo.toml: {}", e);
                return techs;
            }
        };

        for table in ["dependencies", "dev-dependencies"] {
            if let Some(deps) = data.get(table).and_then(|d| d.as_table()) {
                techs.extend(deps.keys().map(|name| name.to_lowercase()));
            }
        }
        techs
    }

    fn from_package_json(&self) -> BTreeSet<String> {
        let mut techs = BTreeSet::new();
        let Some(path) = self.find_manifest("package.json") else {
            return techs;
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return techs;
            }
        };

        let data: serde_json::Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to decode package.json: {}", e);
                return techs;
            }
        };

        for table in ["dependencies", "devDependencies"] {
            if let Some(deps) = data.get(table).and_then(|d| d.as_object()) {
                techs.extend(deps.keys().map(|name| name.to_lowercase()));
            }
        }
        techs
    }
}

/// Normalize a Python requirement specifier to its distribution name.
fn dist_name(spec: &str) -> String {
    spec.split(&['=', '<', '>', '~', '!', '[', ';'][..])
        .next()
        .unwrap_or(spec)
        .trim()
        .to_lowercase()
}
