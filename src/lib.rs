//! readmeforge - AI-Driven README Generator
//!
//! Generates a README.md for a code repository by reading its structure,
//! scoring quality signals, and running a three-stage LLM content pipeline.
//!
//! ## Pipeline
//!
//! 1. **Preanalysis**: the model selects key files from the file tree
//! 2. **Core features**: structured prose extracted from the key files
//! 3. **Overview**: concise project summary synthesized from the features
//!
//! ## Quick Start
//!
//! ```ignore
//! use readmeforge::{Config, ContentPipeline, RepositoryContext, create_provider};
//!
//! let config = Config::default();
//! let ctx = RepositoryContext::read(&config, &repo_path)?;
//! let provider = create_provider(&config.llm)?;
//! let output = ContentPipeline::new(provider, config.pipeline.clone())
//!     .run(&ctx)
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`context`]: repository scanning, dependency extraction, metadata
//! - [`rank`]: quality-signal analysis over the file tree
//! - [`llm`]: provider abstraction, prompts, cleaning, pipeline
//! - [`readme`]: section assembly and output writing
//! - [`config`]: hierarchical configuration

pub mod cli;
pub mod config;
pub mod context;
pub mod llm;
pub mod rank;
pub mod readme;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, LlmConfig, PipelineConfig};

// Error Types
pub use types::error::{ErrorCategory, ForgeError, LlmError, Result};

// Context
pub use context::{DependencyExtractor, FileScanner, RepoMetadata, RepositoryContext};

// Quality
pub use rank::QualityFeatures;

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use llm::{
    ContentPipeline, LlmProvider, OllamaProvider, OpenAiProvider, PipelineOutput, PipelineStage,
    SharedProvider, create_provider,
};

pub use readme::{GeneratedDocument, MarkdownBuilder};
