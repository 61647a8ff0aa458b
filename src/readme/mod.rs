//! README Assembly
//!
//! Combines generated text blocks with static section templates into the
//! final README document. Sections are assembled once, in a fixed order,
//! and the document is written once to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::context::RepositoryContext;
use crate::llm::PipelineOutput;
use crate::rank::QualityFeatures;
use crate::types::{ForgeError, Result};

/// Cap on tech-stack badges so the header stays readable.
const BADGE_LIMIT: usize = 8;

// =============================================================================
// Generated Document
// =============================================================================

/// Ordered sequence of named README sections. Created at the end of a
/// pipeline run and never updated in place; regeneration means re-running
/// the full pipeline.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    sections: Vec<(String, String)>,
}

impl GeneratedDocument {
    /// Render the document body: non-empty sections joined by blank lines.
    pub fn render(&self) -> String {
        let mut body = self
            .sections
            .iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        body.push('\n');
        body
    }

    /// Section names in assembly order, for reporting.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Write the document to `<output_dir>/README.md`. A write failure is
    /// terminal for the run.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)
            .map_err(|e| ForgeError::output(output_dir.display().to_string(), e.to_string()))?;

        let path = output_dir.join("README.md");
        fs::write(&path, self.render())
            .map_err(|e| ForgeError::output(path.display().to_string(), e.to_string()))?;

        info!("README written to {}", path.display());
        Ok(path)
    }
}

// =============================================================================
// Markdown Builder
// =============================================================================

/// Builds each README section from the repository context, quality flags
/// and pipeline output.
pub struct MarkdownBuilder<'a> {
    ctx: &'a RepositoryContext,
    features: QualityFeatures,
    output: &'a PipelineOutput,
}

impl<'a> MarkdownBuilder<'a> {
    pub fn new(
        ctx: &'a RepositoryContext,
        features: QualityFeatures,
        output: &'a PipelineOutput,
    ) -> Self {
        Self {
            ctx,
            features,
            output,
        }
    }

    /// Assemble all sections into the final document.
    pub fn build(&self) -> GeneratedDocument {
        let sections = vec![
            ("header".to_string(), self.header()),
            ("overview".to_string(), self.overview()),
            ("toc".to_string(), self.table_of_contents()),
            ("core_features".to_string(), self.core_features()),
            ("quickstart".to_string(), self.quickstart()),
            ("license".to_string(), self.license()),
            ("contacts".to_string(), self.contacts()),
        ];
        GeneratedDocument { sections }
    }

    fn header(&self) -> String {
        let name = self.ctx.metadata.name.to_uppercase();
        let badges = self.badges();
        if badges.is_empty() {
            format!("# {}", name)
        } else {
            format!("# {}\n\n{}", name, badges)
        }
    }

    /// Shields.io badges for the declared tech stack, capped to keep the
    /// header readable.
    fn badges(&self) -> String {
        self.ctx
            .dependencies
            .iter()
            .take(BADGE_LIMIT)
            .map(|dep| {
                let label = dep.replace('-', "--");
                format!(
                    "![{}](https://img.shields.io/badge/{}-informational?style=flat)",
                    dep, label
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn overview(&self) -> String {
        if self.output.overview.is_empty() {
            String::new()
        } else {
            format!("## Overview\n\n{}", self.output.overview)
        }
    }

    fn table_of_contents(&self) -> String {
        let mut entries = vec!["- [Overview](#overview)", "- [Core Features](#core-features)"];
        entries.push("- [Quick Start](#quick-start)");
        entries.push("- [License](#license)");
        format!("## Table of Contents\n\n{}", entries.join("\n"))
    }

    fn core_features(&self) -> String {
        if self.output.core_features.is_empty() {
            String::new()
        } else {
            format!("## Core Features\n\n{}", self.output.core_features)
        }
    }

    /// Install/run commands inferred from the manifest kind found in the
    /// tree. Manifests count wherever they live, like dependency extraction.
    fn quickstart(&self) -> String {
        let clone_hint = match &self.ctx.repo_url {
            Some(url) => format!("git clone {}\ncd {}\n", url, self.ctx.metadata.name),
            None => String::new(),
        };

        let commands = if self.has_manifest("Cargo.toml") {
            "cargo build --release\ncargo run"
        } else if self.has_manifest("package.json") {
            "npm install\nnpm start"
        } else if self.has_manifest("pyproject.toml") {
            "pip install ."
        } else if self.has_manifest("requirements.txt") {
            "pip install -r requirements.txt"
        } else {
            return String::new();
        };

        format!("## Quick Start\n\n```sh\n{}{}\n```", clone_hint, commands)
    }

    /// True when any tree entry's file name matches `name`.
    fn has_manifest(&self, name: &str) -> bool {
        self.ctx.tree.lines().any(|line| {
            Path::new(line)
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == name)
        })
    }

    fn license(&self) -> String {
        if self.features.license_present {
            let link = match &self.ctx.repo_url {
                Some(url) => format!("[LICENSE]({}/blob/main/LICENSE)", url.trim_end_matches('/')),
                None => "[LICENSE](LICENSE)".to_string(),
            };
            format!(
                "## License\n\nThis project is distributed under the terms of the {} file.",
                link
            )
        } else {
            "## License\n\nNo license file was found in this repository. Consider adding one."
                .to_string()
        }
    }

    fn contacts(&self) -> String {
        match &self.ctx.repo_url {
            Some(url) => format!(
                "## Contacts\n\nQuestions and suggestions are welcome in the [issue tracker]({}/issues).",
                url.trim_end_matches('/')
            ),
            None => String::new(),
        }
    }
}
