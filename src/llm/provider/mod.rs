//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait for plain-text completion. Providers are
//! pure passthroughs: the prompt is sent unmodified and the raw response
//! text is returned. No retry logic lives here; failures surface to the
//! caller as classified errors.

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{ForgeError, Result};

/// Shared LLM provider handle for use across pipeline stages.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM backend reachable over a network API.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a prompt to the backend's completion endpoint and return the
    /// raw response text. The prompt is never mutated.
    async fn send_request(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is available
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration.
///
/// Provider selection is a closed enumeration; an unrecognized name is a
/// configuration error surfaced before any network call.
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(ForgeError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        let err = create_provider(&config);
        assert!(matches!(err, Err(ForgeError::Config(_))));
    }

    #[test]
    fn test_ollama_provider_created() {
        let config = LlmConfig {
            provider: "ollama".to_string(),
            ..LlmConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }
}
