//! LLM Content Generation
//!
//! Provider abstraction, prompt assembly, response cleaning and the
//! three-stage content pipeline.
//!
//! ## Modules
//!
//! - `provider`: backend trait + openai/ollama implementations
//! - `prompt`: embedded templates and fail-fast placeholder rendering
//! - `cleaner`: idempotent response normalization
//! - `pipeline`: preanalysis → core features → overview orchestration

pub mod cleaner;
pub mod pipeline;
pub mod prompt;
pub mod provider;

pub use cleaner::clean;
pub use pipeline::{
    ContentPipeline, PipelineOutput, PipelineStage, PipelineStageResult, extract_relative_paths,
};
pub use prompt::PromptTemplates;
pub use provider::{LlmProvider, OllamaProvider, OpenAiProvider, SharedProvider, create_provider};
