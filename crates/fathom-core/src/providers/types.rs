//! Provider-agnostic types for LLM-backed agents

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single message in a chat exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// JSON schema the model's output must conform to (structured output)
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    /// Schema name sent to the provider (e.g. "search_plan")
    pub name: String,
    /// The JSON schema document itself
    pub schema: Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Completed response from an LLM
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: ChatUsage,
}

/// Token usage from a single API call
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Trait that all LLM providers implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai")
    fn provider_name(&self) -> &str;

    /// Model identifier (e.g. "gpt-4o-mini")
    fn model(&self) -> &str;

    /// Send a chat request. When `schema` is given the provider must constrain
    /// the model to emit JSON conforming to it.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        schema: Option<&ResponseSchema>,
    ) -> Result<ChatResponse>;
}
