//! A named agent: fixed instructions bound to an LLM provider

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::providers::{ChatMessage, LlmProvider, ResponseSchema};

/// An agent is a set of instructions plus the provider that executes them.
/// The instructions become the system message of every run.
#[derive(Clone)]
pub struct Agent {
    name: String,
    instructions: String,
    provider: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.provider.model())
            .finish()
    }
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn messages(&self, input: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.instructions.clone()),
            ChatMessage::user(input),
        ]
    }

    /// Run the agent and return its plain-text output
    pub async fn run(&self, input: &str) -> Result<String> {
        debug!(agent = %self.name, input_len = input.len(), "Running agent");
        let response = self.provider.chat(&self.messages(input), None).await?;
        debug!(
            agent = %self.name,
            tokens_out = response.usage.output_tokens,
            "Agent finished"
        );
        Ok(response.content)
    }

    /// Run the agent with structured output and parse the result
    pub async fn run_structured<T: DeserializeOwned>(
        &self,
        input: &str,
        schema: &ResponseSchema,
    ) -> Result<T> {
        debug!(agent = %self.name, schema = %schema.name, "Running agent (structured)");
        let response = self
            .provider
            .chat(&self.messages(input), Some(schema))
            .await?;
        serde_json::from_str(&response.content).with_context(|| {
            format!(
                "Agent '{}' returned output that does not match schema '{}'",
                self.name, schema.name
            )
        })
    }
}
