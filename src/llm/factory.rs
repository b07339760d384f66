//! LLM client and generator factory.
//!
//! Centralizes provider-specific logic for turning `[llm]` settings into a
//! [`SqlGenerator`].

use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::error::{AskError, Result};
use crate::llm::anthropic::{AnthropicClient, AnthropicConfig};
use crate::llm::generator::{CannedSqlGenerator, LlmSqlGenerator, SqlGenerator};
use crate::llm::mock::MockLlmClient;
use crate::llm::openai::{self, OpenAiClient, OpenAiConfig};
use crate::llm::{LlmClient, LlmProvider};

/// Provider name that selects [`CannedSqlGenerator`].
pub const CANNED_PROVIDER: &str = "canned";

/// Model used for Anthropic when the settings still name the OpenAI default.
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Creates an LLM client for the given provider.
///
/// API keys are resolved in order:
/// 1. `api_key` from the settings
/// 2. Environment variable (`OPENAI_API_KEY` or `ANTHROPIC_API_KEY`)
pub fn create_client(provider: LlmProvider, config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match provider {
        LlmProvider::OpenAi => {
            let key = resolve_key(config, "OPENAI_API_KEY")?;
            let mut client_config = OpenAiConfig::new(key, config.model.clone())
                .with_temperature(config.temperature)
                .with_max_tokens(config.max_tokens)
                .with_timeout(config.timeout_secs);
            if let Some(base_url) = &config.base_url {
                client_config = client_config.with_base_url(base_url.clone());
            }
            Ok(Box::new(OpenAiClient::new(client_config)?))
        }
        LlmProvider::Anthropic => {
            let key = resolve_key(config, "ANTHROPIC_API_KEY")?;
            let model = if config.model == openai::DEFAULT_MODEL {
                ANTHROPIC_DEFAULT_MODEL.to_string()
            } else {
                config.model.clone()
            };
            let mut client_config = AnthropicConfig::new(key, model)
                .with_temperature(config.temperature)
                .with_timeout(config.timeout_secs);
            if let Some(max_tokens) = config.max_tokens {
                client_config = client_config.with_max_tokens(max_tokens);
            }
            if let Some(base_url) = &config.base_url {
                client_config = client_config.with_base_url(base_url.clone());
            }
            Ok(Box::new(AnthropicClient::new(client_config)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

/// Builds the SQL generator described by the settings.
///
/// Client construction failures (unknown provider, missing key) are
/// configuration errors, reported before any question is asked.
pub fn create_generator(config: &LlmConfig) -> Result<Box<dyn SqlGenerator>> {
    if config.provider.eq_ignore_ascii_case(CANNED_PROVIDER) {
        warn!("Using canned SQL generator; questions are ignored");
        return Ok(Box::new(CannedSqlGenerator::new()));
    }

    let provider: LlmProvider = config.provider.parse().map_err(AskError::config)?;
    let client = create_client(provider, config).map_err(|e| match e {
        AskError::Generation(msg) => AskError::config(msg),
        other => other,
    })?;

    info!(%provider, model = %config.model, "LLM provider configured");
    Ok(Box::new(LlmSqlGenerator::new(client)))
}

fn resolve_key(config: &LlmConfig, env_var: &str) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|key| !key.is_empty()))
        .ok_or_else(|| {
            AskError::generation(format!(
                "No API key configured. Set api_key under [llm] or {}.",
                env_var
            ))
        })
}
