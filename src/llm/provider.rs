// ABOUTME: Runtime LLM provider selection for program generation
// ABOUTME: Resolves PIERRE_LLM_PROVIDER into a concrete provider behind the LlmProvider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Selector
//!
//! This module provides a unified entry point for LLM providers that can be
//! configured at runtime via environment variables.
//!
//! ## Configuration
//!
//! Set `PIERRE_LLM_PROVIDER` environment variable:
//! - `local` (default): `OpenAI`-compatible endpoint configured by `LOCAL_LLM_*`
//! - `ollama`, `vllm`, `localai`: aliases that resolve to the same local provider
//!
//! ## Example
//!
//! ```rust,no_run
//! use pierre_program_engine::llm::{ChatMessage, ChatRequest, ChatProvider, LlmProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pierre_program_engine::errors::AppError> {
//!     let provider = ChatProvider::from_env()?;
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::user("Hello!"),
//!     ]);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use std::env;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{
    ChatRequest, ChatResponse, ChatStream, LlmCapabilities, LlmProvider, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider,
};
use crate::errors::AppError;

/// Unified chat provider selected at runtime
///
/// Wraps the concrete provider behind one type so the rest of the engine can
/// hold an `Arc<dyn LlmProvider>` without caring which backend serves it.
pub enum ChatProvider {
    /// Local LLM provider via `OpenAI`-compatible API (Ollama, vLLM, `LocalAI`)
    Local(OpenAiCompatibleProvider),
}

impl ChatProvider {
    /// Environment variable name for LLM provider selection
    pub const ENV_VAR: &'static str = "PIERRE_LLM_PROVIDER";

    /// Create a provider from environment configuration
    ///
    /// Reads `PIERRE_LLM_PROVIDER` to determine which provider to use.
    /// `local`, `ollama`, `vllm`, and `localai` all select the local
    /// `OpenAI`-compatible provider; unrecognized values fall back to `local`
    /// with a warning so a typo never leaves the engine without a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn from_env() -> Result<Self, AppError> {
        let selected = env::var(Self::ENV_VAR).unwrap_or_else(|_| "local".to_owned());

        info!(
            "Initializing LLM provider: {selected} (set {} to change)",
            Self::ENV_VAR
        );

        let provider = match selected.to_lowercase().as_str() {
            "local" | "ollama" | "vllm" | "localai" => Self::local()?,
            other => {
                warn!("Unknown LLM provider '{other}', using local provider");
                Self::local()?
            }
        };

        debug!(
            "Provider {} initialized with model: {}",
            provider.display_name(),
            provider.default_model()
        );

        Ok(provider)
    }

    /// Create a local LLM provider explicitly
    ///
    /// Uses environment variables for configuration:
    /// - `LOCAL_LLM_BASE_URL`: API endpoint (default: Ollama at localhost:11434)
    /// - `LOCAL_LLM_MODEL`: Model name (default: qwen2.5:14b-instruct)
    /// - `LOCAL_LLM_API_KEY`: API key (optional)
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be initialized.
    pub fn local() -> Result<Self, AppError> {
        Ok(Self::Local(OpenAiCompatibleProvider::from_env()?))
    }

    /// Create a provider from an explicit configuration
    ///
    /// Use this when the endpoint is already resolved, for example from a
    /// deployment manifest rather than process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn with_config(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        Ok(Self::Local(OpenAiCompatibleProvider::new(config)?))
    }
}

// Delegate LlmProvider trait methods to the underlying provider
#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        let Self::Local(provider) = self;
        provider.name()
    }

    fn display_name(&self) -> &'static str {
        let Self::Local(provider) = self;
        provider.display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        let Self::Local(provider) = self;
        provider.capabilities()
    }

    fn default_model(&self) -> &str {
        let Self::Local(provider) = self;
        provider.default_model()
    }

    fn available_models(&self) -> &'static [&'static str] {
        let Self::Local(provider) = self;
        provider.available_models()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let Self::Local(provider) = self;
        provider.complete(request).await
    }

    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChatStream, AppError> {
        let Self::Local(provider) = self;
        provider.complete_stream(request).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let Self::Local(provider) = self;
        provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_provider_env() {
        env::remove_var(ChatProvider::ENV_VAR);
        env::remove_var("LOCAL_LLM_BASE_URL");
        env::remove_var("LOCAL_LLM_MODEL");
        env::remove_var("LOCAL_LLM_API_KEY");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_to_local() {
        clear_provider_env();

        let provider = ChatProvider::from_env().unwrap();
        // Default base URL points at Ollama, so the sniffed name reflects that
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.default_model(), "qwen2.5:14b-instruct");
    }

    #[test]
    #[serial]
    fn test_from_env_accepts_local_aliases() {
        clear_provider_env();

        for alias in ["local", "ollama", "vLLM", "localai"] {
            env::set_var(ChatProvider::ENV_VAR, alias);
            let provider = ChatProvider::from_env().unwrap();
            assert!(matches!(provider, ChatProvider::Local(_)));
        }

        env::remove_var(ChatProvider::ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_from_env_unknown_value_falls_back_to_local() {
        clear_provider_env();
        env::set_var(ChatProvider::ENV_VAR, "gpt-42");

        let provider = ChatProvider::from_env().unwrap();
        assert!(matches!(provider, ChatProvider::Local(_)));

        env::remove_var(ChatProvider::ENV_VAR);
    }

    #[test]
    fn test_with_config_uses_explicit_endpoint() {
        let provider =
            ChatProvider::with_config(OpenAiCompatibleConfig::vllm("meta-llama/Llama-3.1-8B"))
                .unwrap();

        assert_eq!(provider.name(), "vllm");
        assert_eq!(provider.default_model(), "meta-llama/Llama-3.1-8B");
        assert!(provider.capabilities().supports_json_mode());
    }
}
