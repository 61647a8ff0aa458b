//! Repository Quality Analyzer
//!
//! Scores presence/absence of community-health signals by pattern matching
//! over the repository file tree: README, license, documentation, examples
//! and tests. Pure function of the tree string; flags are recomputed on
//! demand and carry no persistent identity.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static README: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bREADME(\.\w+)?\b").expect("valid regex"));

static LICENSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLICEN[SC]E(\.\w+)?\b").expect("valid regex"));

static DOCS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(docs?|documentation|wiki|manuals?)\b").expect("valid regex"));

static EXAMPLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(tutorials?|examples|notebooks?)\b").expect("valid regex"));

static TESTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btests?\b").expect("valid regex"));

/// Boolean quality flags derived from the file tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityFeatures {
    pub readme_present: bool,
    pub license_present: bool,
    pub docs_present: bool,
    pub examples_present: bool,
    pub tests_present: bool,
}

impl QualityFeatures {
    /// Evaluate all flags against a newline-joined file tree.
    /// An empty tree yields all-false.
    pub fn from_tree(tree: &str) -> Self {
        Self {
            readme_present: README.is_match(tree),
            license_present: LICENSE.is_match(tree),
            docs_present: DOCS.is_match(tree),
            examples_present: EXAMPLES.is_match(tree),
            tests_present: TESTS.is_match(tree),
        }
    }

    /// Render a short text report of the flags.
    pub fn report(&self) -> String {
        fn mark(present: bool) -> &'static str {
            if present { "✓" } else { "✗" }
        }

        format!(
            "README:        {}\n\
             License:       {}\n\
             Documentation: {}\n\
             Examples:      {}\n\
             Tests:         {}",
            mark(self.readme_present),
            mark(self.license_present),
            mark(self.docs_present),
            mark(self.examples_present),
            mark(self.tests_present),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree_all_false() {
        let features = QualityFeatures::from_tree("");
        assert!(!features.readme_present);
        assert!(!features.license_present);
        assert!(!features.docs_present);
        assert!(!features.examples_present);
        assert!(!features.tests_present);
    }

    #[test]
    fn test_readme_variants() {
        assert!(QualityFeatures::from_tree("README.md").readme_present);
        assert!(QualityFeatures::from_tree("readme.rst").readme_present);
        assert!(QualityFeatures::from_tree("docs/README").readme_present);
        assert!(!QualityFeatures::from_tree("src/main.py").readme_present);
    }

    #[test]
    fn test_license_spellings() {
        assert!(QualityFeatures::from_tree("LICENSE").license_present);
        assert!(QualityFeatures::from_tree("LICENCE.txt").license_present);
        assert!(QualityFeatures::from_tree("license.md").license_present);
        assert!(!QualityFeatures::from_tree("src/lic.rs").license_present);
    }

    #[test]
    fn test_docs_and_examples() {
        let features = QualityFeatures::from_tree("docs/index.md\nexamples/demo.py");
        assert!(features.docs_present);
        assert!(features.examples_present);

        assert!(QualityFeatures::from_tree("notebooks/analysis.ipynb").examples_present);
        assert!(QualityFeatures::from_tree("manual/usage.txt").docs_present);
    }

    #[test]
    fn test_tests_detection() {
        assert!(QualityFeatures::from_tree("tests/test_main.py").tests_present);
        assert!(QualityFeatures::from_tree("src/test/java/App.java").tests_present);
        assert!(!QualityFeatures::from_tree("src/contest.rs").tests_present);
    }

    #[test]
    fn test_minimal_python_project() {
        let tree = "README.md\nsrc/main.py\nLICENSE";
        let features = QualityFeatures::from_tree(tree);
        assert!(features.readme_present);
        assert!(features.license_present);
        assert!(!features.docs_present);
        assert!(!features.examples_present);
        assert!(!features.tests_present);
    }

    #[test]
    fn test_report_rendering() {
        let report = QualityFeatures::from_tree("README.md").report();
        assert!(report.contains("README:        ✓"));
        assert!(report.contains("License:       ✗"));
    }
}
