//! Content Pipeline
//!
//! Three-stage LLM orchestration producing README content from a repository
//! context:
//!
//! 1. **Preanalysis** - the model selects key files from the file tree
//! 2. **Core features** - structured prose from the key files' content
//! 3. **Overview** - concise project summary from the core features
//!
//! Stages run strictly sequentially; each stage's prompt is built only from
//! the repository context and earlier stage results. A backend failure in
//! any stage aborts the run. An unparseable preanalysis response degrades to
//! an empty key-file list instead of failing.

use std::collections::HashMap;
use std::sync::LazyLock;

use futures::future::join_all;
use regex::Regex;
use tracing::{debug, error, info, warn};

use super::cleaner::clean;
use super::prompt::{self, PromptTemplates};
use super::provider::SharedProvider;
use crate::config::PipelineConfig;
use crate::context::RepositoryContext;
use crate::types::{ForgeError, Result};

/// Tokens that look like relative file paths: at least one path separator
/// or a file extension, built from path-safe characters. Extensionless
/// names like `docker/Dockerfile` qualify through the separator; the tree
/// check downstream discards false positives.
static PATH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[A-Za-z0-9_][A-Za-z0-9_.\-]*(?:/[A-Za-z0-9_.\-]+)+|[A-Za-z0-9_][A-Za-z0-9_.\-]*\.[A-Za-z0-9_]+",
    )
    .expect("valid regex")
});

// =============================================================================
// Stage Results
// =============================================================================

/// Ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Preanalysis,
    CoreFeatures,
    Overview,
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Preanalysis => "preanalysis",
            Self::CoreFeatures => "core_features",
            Self::Overview => "overview",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Generated text plus the stage that produced it. Immutable once created.
#[derive(Debug, Clone)]
pub struct PipelineStageResult {
    pub stage: PipelineStage,
    pub text: String,
}

/// Final pipeline output consumed by the document assembler.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Key files selected in preanalysis (validated against the tree)
    pub key_files: Vec<String>,
    /// Cleaned core-features text
    pub core_features: String,
    /// Cleaned overview text
    pub overview: String,
}

// =============================================================================
// Content Pipeline
// =============================================================================

/// Orchestrates the three-stage content generation sequence against a
/// single provider. One instance serves one logical run.
pub struct ContentPipeline {
    provider: SharedProvider,
    config: PipelineConfig,
    templates: &'static PromptTemplates,
}

impl ContentPipeline {
    pub fn new(provider: SharedProvider, config: PipelineConfig) -> Self {
        Self {
            provider,
            config,
            templates: PromptTemplates::get(),
        }
    }

    /// Run all stages and return the generated text blocks.
    pub async fn run(&self, ctx: &RepositoryContext) -> Result<PipelineOutput> {
        let key_files = self.preanalysis(ctx).await?;
        let files_content = self.load_key_files(ctx, &key_files).await;

        let core_features = self.core_features(ctx, &files_content).await?;
        let overview = self.overview(ctx, &core_features.text).await?;

        Ok(PipelineOutput {
            key_files,
            core_features: clean(&core_features.text),
            overview: clean(&overview.text),
        })
    }

    /// Stage 1: ask the model for key files and parse its free-text answer
    /// into tree-validated relative paths.
    async fn preanalysis(&self, ctx: &RepositoryContext) -> Result<Vec<String>> {
        let stage = PipelineStage::Preanalysis;
        let mut vars = HashMap::new();
        vars.insert("project_name", ctx.metadata.name.clone());
        vars.insert("tree", ctx.tree.clone());

        let prompt = prompt::render(stage.name(), &self.templates.preanalysis, &vars)?;
        let response = self.invoke(stage, ctx, &prompt).await?;
        let cleaned = clean(&response.text);

        let candidates = extract_relative_paths(&cleaned);
        let mut key_files = Vec::new();
        for candidate in candidates {
            if key_files.len() >= self.config.max_key_files {
                break;
            }
            if ctx.tree_contains(&candidate) {
                if !key_files.contains(&candidate) {
                    key_files.push(candidate);
                }
            } else {
                warn!("Dropping path not present in tree: {}", candidate);
            }
        }

        if key_files.is_empty() {
            // Degrade gracefully: stage 2 proceeds with an empty context
            warn!(
                "Preanalysis yielded no usable key files for {}",
                ctx.identifier()
            );
        } else {
            info!(
                "Preanalysis completed: {} key files identified",
                key_files.len()
            );
        }

        Ok(key_files)
    }

    /// Load key file contents concurrently. Reads are independent; failures
    /// are logged and the file skipped. Results are merged in key-file
    /// order, each block keyed by its path.
    async fn load_key_files(&self, ctx: &RepositoryContext, key_files: &[String]) -> String {
        let max_chars = self.config.max_file_chars;

        let reads = key_files.iter().map(|rel| {
            let abs = ctx.local_path.join(rel);
            async move {
                match tokio::fs::read_to_string(&abs).await {
                    Ok(content) => Some((rel.clone(), truncate_chars(&content, max_chars))),
                    Err(e) => {
                        warn!("Skipping unreadable key file {}: {}", rel, e);
                        None
                    }
                }
            }
        });

        let blocks: Vec<String> = join_all(reads)
            .await
            .into_iter()
            .flatten()
            .map(|(path, content)| format!("### {}\n{}", path, content))
            .collect();

        debug!("Loaded {} of {} key files", blocks.len(), key_files.len());
        blocks.join("\n\n")
    }

    /// Stage 2: core features from key file content.
    async fn core_features(
        &self,
        ctx: &RepositoryContext,
        files_content: &str,
    ) -> Result<PipelineStageResult> {
        let stage = PipelineStage::CoreFeatures;
        let content = if files_content.is_empty() {
            "(no key file content available)".to_string()
        } else {
            files_content.to_string()
        };

        let mut vars = HashMap::new();
        vars.insert("project_name", ctx.metadata.name.clone());
        vars.insert("full_name", ctx.metadata.full_name.clone());
        vars.insert(
            "dependencies",
            ctx.dependencies
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        );
        vars.insert("files_content", content);

        let prompt = prompt::render(stage.name(), &self.templates.core_features, &vars)?;
        let result = self.invoke(stage, ctx, &prompt).await?;
        info!("Core features analysis completed successfully.");
        Ok(result)
    }

    /// Stage 3: overview synthesized from the core features.
    async fn overview(
        &self,
        ctx: &RepositoryContext,
        core_features: &str,
    ) -> Result<PipelineStageResult> {
        let stage = PipelineStage::Overview;
        let mut vars = HashMap::new();
        vars.insert("project_name", ctx.metadata.name.clone());
        vars.insert("full_name", ctx.metadata.full_name.clone());
        vars.insert("core_features", core_features.to_string());

        let prompt = prompt::render(stage.name(), &self.templates.overview, &vars)?;
        let result = self.invoke(stage, ctx, &prompt).await?;
        info!("Overview analysis completed successfully.");
        Ok(result)
    }

    /// Send the assembled prompt to the backend. No retry: a failure is
    /// logged with stage and repository context and aborts the run.
    async fn invoke(
        &self,
        stage: PipelineStage,
        ctx: &RepositoryContext,
        prompt: &str,
    ) -> Result<PipelineStageResult> {
        debug!(
            "Invoking {} for stage '{}' ({} prompt chars)",
            self.provider.name(),
            stage,
            prompt.len()
        );

        match self.provider.send_request(prompt).await {
            Ok(text) => Ok(PipelineStageResult { stage, text }),
            Err(e) => {
                error!(
                    "Stage '{}' failed for {}: {}",
                    stage,
                    ctx.identifier(),
                    e
                );
                Err(ForgeError::pipeline(
                    stage.name(),
                    ctx.identifier(),
                    e.to_string(),
                ))
            }
        }
    }
}

// =============================================================================
// Path Extraction
// =============================================================================

/// Extract path-like tokens from free-form model text, tolerating
/// surrounding commentary, bullets and backticks. Returned paths are not
/// yet validated against the tree.
pub fn extract_relative_paths(text: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for m in PATH_TOKEN.find_iter(text) {
        let token = m.as_str().trim_end_matches('.').to_string();
        if !paths.contains(&token) {
            paths.push(token);
        }
    }
    paths
}

/// Truncate to a character budget on a char boundary.
fn truncate_chars(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        content.chars().take(max_chars).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::provider::LlmProvider;
    use crate::types::{ErrorCategory, ForgeError, LlmError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted backend: pops canned responses in order and records every
    /// prompt it receives.
    struct MockProvider {
        responses: Mutex<VecDeque<std::result::Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(responses: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses.into_iter().map(|r| Ok(r.to_string())).collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing_at(responses: Vec<&str>, error: &str) -> Arc<Self> {
            let mut queue: VecDeque<std::result::Result<String, String>> =
                responses.into_iter().map(|r| Ok(r.to_string())).collect();
            queue.push_back(Err(error.to_string()));
            Arc::new(Self {
                responses: Mutex::new(queue),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn send_request(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(msg)) => {
                    Err(LlmError::new(ErrorCategory::Unavailable, msg).into())
                }
                None => Err(ForgeError::LlmApi("mock exhausted".to_string()).into()),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn fixture_repo() -> (tempfile::TempDir, RepositoryContext) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.py"), "def main(): pass").unwrap();
        std::fs::write(dir.path().join("src/util.py"), "def helper(): pass").unwrap();
        std::fs::write(dir.path().join("README.md"), "# old readme").unwrap();

        let config = Config::default();
        let ctx = RepositoryContext::read(&config, dir.path()).unwrap();
        (dir, ctx)
    }

    #[test]
    fn test_extract_relative_paths_comma_separated() {
        let paths = extract_relative_paths("src/main.py, src/util.py");
        assert_eq!(paths, vec!["src/main.py", "src/util.py"]);
    }

    #[test]
    fn test_extract_relative_paths_with_commentary() {
        let text = "The key files are:\n- `src/main.py` (entry point)\n- src/util.py\nThose cover it.";
        let paths = extract_relative_paths(text);
        assert!(paths.contains(&"src/main.py".to_string()));
        assert!(paths.contains(&"src/util.py".to_string()));
    }

    #[test]
    fn test_extract_relative_paths_no_paths() {
        assert!(extract_relative_paths("I cannot determine any files.").is_empty());
    }

    #[test]
    fn test_extract_extensionless_paths() {
        let paths = extract_relative_paths("Look at docker/Dockerfile and scripts/build first.");
        assert!(paths.contains(&"docker/Dockerfile".to_string()));
        assert!(paths.contains(&"scripts/build".to_string()));
    }

    #[tokio::test]
    async fn test_extensionless_key_file_selected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docker")).unwrap();
        std::fs::write(dir.path().join("docker/Dockerfile"), "FROM alpine").unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')").unwrap();
        let ctx = RepositoryContext::read(&Config::default(), dir.path()).unwrap();

        let provider = MockProvider::new(vec!["docker/Dockerfile, main.py", "- features", "done"]);
        let pipeline =
            ContentPipeline::new(provider.clone(), crate::config::PipelineConfig::default());
        let output = pipeline.run(&ctx).await.unwrap();

        assert_eq!(output.key_files, vec!["docker/Dockerfile", "main.py"]);
        assert!(provider.prompts()[1].contains("FROM alpine"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
    }

    #[tokio::test]
    async fn test_full_run_stage_ordering() {
        let (_dir, ctx) = fixture_repo();
        let provider = MockProvider::new(vec![
            "src/main.py, src/util.py",
            "- Runs main()\n- Provides helpers",
            "A small demo project.",
        ]);

        let pipeline =
            ContentPipeline::new(provider.clone(), crate::config::PipelineConfig::default());
        let output = pipeline.run(&ctx).await.unwrap();

        assert_eq!(output.key_files, vec!["src/main.py", "src/util.py"]);
        assert_eq!(output.core_features, "- Runs main()\n- Provides helpers");
        assert_eq!(output.overview, "A small demo project.");

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 3);
        // Stage 1 prompt carries the tree
        assert!(prompts[0].contains("src/main.py"));
        // Stage 2 prompt carries the selected files' CONTENT, not the
        // stage-1 prompt text
        assert!(prompts[1].contains("def main(): pass"));
        assert!(prompts[1].contains("def helper(): pass"));
        assert!(!prompts[1].contains("Identify the files"));
        // Stage 3 prompt is built from stage 2's output
        assert!(prompts[2].contains("- Runs main()"));
    }

    #[tokio::test]
    async fn test_hallucinated_paths_dropped() {
        let (_dir, ctx) = fixture_repo();
        let provider = MockProvider::new(vec![
            "src/main.py, src/made_up.py",
            "- features",
            "overview",
        ]);

        let pipeline =
            ContentPipeline::new(provider.clone(), crate::config::PipelineConfig::default());
        let output = pipeline.run(&ctx).await.unwrap();

        assert_eq!(output.key_files, vec!["src/main.py"]);
    }

    #[tokio::test]
    async fn test_unparseable_preanalysis_degrades() {
        let (_dir, ctx) = fixture_repo();
        let provider = MockProvider::new(vec![
            "I am not sure which files matter here.",
            "- features",
            "overview",
        ]);

        let pipeline =
            ContentPipeline::new(provider.clone(), crate::config::PipelineConfig::default());
        let output = pipeline.run(&ctx).await.unwrap();

        assert!(output.key_files.is_empty());
        // Stage 2 still ran, with the empty-context marker
        assert!(provider.prompts()[1].contains("(no key file content available)"));
        assert_eq!(output.overview, "overview");
    }

    #[tokio::test]
    async fn test_backend_failure_aborts_run() {
        let (_dir, ctx) = fixture_repo();
        let provider = MockProvider::failing_at(vec!["src/main.py"], "backend down");

        let pipeline =
            ContentPipeline::new(provider.clone(), crate::config::PipelineConfig::default());
        let err = pipeline.run(&ctx).await.unwrap_err();

        // The failure carries the stage and repository it happened in
        match err {
            ForgeError::Pipeline { stage, repository, .. } => {
                assert_eq!(stage, "core_features");
                assert_eq!(repository, ctx.identifier());
            }
            other => panic!("unexpected error: {}", other),
        }
        // The failure happened in stage 2; stage 3 never ran
        assert_eq!(provider.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_fenced_preanalysis_response() {
        let (_dir, ctx) = fixture_repo();
        let provider = MockProvider::new(vec![
            "```\nsrc/main.py\nsrc/util.py\n```",
            "- features",
            "overview",
        ]);

        let pipeline =
            ContentPipeline::new(provider.clone(), crate::config::PipelineConfig::default());
        let output = pipeline.run(&ctx).await.unwrap();
        assert_eq!(output.key_files, vec!["src/main.py", "src/util.py"]);
    }

    #[tokio::test]
    async fn test_key_file_cap_respected() {
        let (_dir, ctx) = fixture_repo();
        let provider = MockProvider::new(vec![
            "src/main.py, src/util.py, README.md",
            "- features",
            "overview",
        ]);

        let config = crate::config::PipelineConfig {
            max_key_files: 1,
            ..Default::default()
        };
        let pipeline = ContentPipeline::new(provider.clone(), config);
        let output = pipeline.run(&ctx).await.unwrap();
        assert_eq!(output.key_files, vec!["src/main.py"]);
    }
}
