//! Generate Command
//!
//! Runs the full README generation pipeline for a repository path:
//! context read → quality scoring → three LLM stages → document write.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::output::Output;
use crate::config::{Config, ConfigLoader};
use crate::context::RepositoryContext;
use crate::llm::{ContentPipeline, SharedProvider, create_provider};
use crate::rank::QualityFeatures;
use crate::readme::MarkdownBuilder;
use crate::types::Result;

/// CLI overrides applied on top of the resolved configuration.
#[derive(Debug, Default)]
pub struct GenerateOptions {
    pub repo_url: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
}

pub async fn run(path: &Path, opts: GenerateOptions) -> Result<()> {
    let out = Output::new();
    let config = resolve_config(opts.clone_overrides())?;

    let ctx = RepositoryContext::read(&config, path)?;
    let features = QualityFeatures::from_tree(&ctx.tree);

    if opts.dry_run {
        out.section("Effective configuration");
        println!("{:#?}", config.llm);
        out.section("Quality features");
        println!("{}", features.report());
        out.section("File tree");
        println!("{}", ctx.tree);
        return Ok(());
    }

    info!("Generating README for {}", ctx.identifier());

    let provider = create_provider(&config.llm)?;
    out.info(&format!(
        "Using provider '{}' with model '{}'",
        provider.name(),
        provider.model()
    ));
    preflight(&provider, &out).await;

    let pipeline = ContentPipeline::new(provider, config.pipeline.clone());
    let generated = pipeline.run(&ctx).await?;

    if !generated.key_files.is_empty() {
        out.info(&format!(
            "Key files: {}",
            generated.key_files.join(", ")
        ));
    }

    let document = MarkdownBuilder::new(&ctx, features, &generated).build();
    let written = document.write(&config.output.dir)?;

    out.success(&format!("README generated: {}", written.display()));
    Ok(())
}

impl GenerateOptions {
    fn clone_overrides(&self) -> GenerateOptions {
        GenerateOptions {
            repo_url: self.repo_url.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            output: self.output.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Advisory backend reachability check before any pipeline stage runs.
/// An inconclusive result is reported but does not block the run.
async fn preflight(provider: &SharedProvider, out: &Output) -> bool {
    match provider.health_check().await {
        Ok(true) => {
            out.success(&format!("Provider '{}' is reachable", provider.name()));
            true
        }
        Ok(false) | Err(_) => {
            out.warning(&format!(
                "Provider '{}' health check inconclusive, continuing anyway",
                provider.name()
            ));
            false
        }
    }
}

/// Load configuration and apply CLI overrides (highest priority).
fn resolve_config(opts: GenerateOptions) -> Result<Config> {
    let mut config = ConfigLoader::load()?;

    if opts.repo_url.is_some() {
        config.git.repository = opts.repo_url;
    }
    if let Some(provider) = opts.provider {
        config.llm.provider = provider;
    }
    if opts.model.is_some() {
        config.llm.model = opts.model;
    }
    if opts.api_base.is_some() {
        config.llm.api_base = opts.api_base;
    }
    if let Some(output) = opts.output {
        config.output.dir = output;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct HealthProbe {
        healthy: crate::types::Result<bool>,
    }

    #[async_trait]
    impl LlmProvider for HealthProbe {
        async fn send_request(&self, _prompt: &str) -> crate::types::Result<String> {
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn health_check(&self) -> crate::types::Result<bool> {
            match &self.healthy {
                Ok(flag) => Ok(*flag),
                Err(_) => Err(crate::types::ForgeError::LlmApi("down".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_preflight_reports_health() {
        let out = Output::new();

        let healthy: SharedProvider = Arc::new(HealthProbe { healthy: Ok(true) });
        assert!(preflight(&healthy, &out).await);

        let unhealthy: SharedProvider = Arc::new(HealthProbe { healthy: Ok(false) });
        assert!(!preflight(&unhealthy, &out).await);

        // An erroring backend is inconclusive, never a hard failure
        let down: SharedProvider = Arc::new(HealthProbe {
            healthy: Err(crate::types::ForgeError::LlmApi("down".to_string())),
        });
        assert!(!preflight(&down, &out).await);
    }

    #[test]
    fn test_cli_overrides_win() {
        let opts = GenerateOptions {
            provider: Some("ollama".to_string()),
            model: Some("llama3:latest".to_string()),
            output: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };
        let config = resolve_config(opts).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama3:latest"));
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
    }
}
