//! Language-model backends that turn a question into SQL.
//!
//! An [`LlmClient`] is a raw chat endpoint; the [`SqlGenerator`] adapters wrap
//! one with the schema prompt and fence stripping.

pub mod anthropic;
pub mod factory;
pub mod generator;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use factory::{create_client, create_generator};
pub use generator::{CannedSqlGenerator, LlmSqlGenerator, SqlGenerator};
pub use mock::{FailingLlmClient, MockLlmClient};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::clean_sql_response;
pub use prompt::{build_messages, build_system_prompt};
pub use types::{Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// A chat endpoint. One call, one full reply: no streaming, no retries.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `messages` and returns the reply text as received.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Which backend `--llm` selects. `canned` is handled by the generator
/// factory and never reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI, or any server speaking its chat completions API.
    #[default]
    OpenAi,
    Anthropic,
    /// Pattern-matched replies, no network.
    Mock,
}

impl LlmProvider {
    /// Name as written in config and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
