//! OpenAI-compatible chat completions provider
//!
//! Works against api.openai.com or any compatible relay (the default config
//! points at a proxy base URL), which is why the base URL is injectable.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use async_trait::async_trait;

use super::types::{ChatMessage, ChatResponse, ChatUsage, LlmProvider, ResponseSchema};

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String, max_tokens: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_tokens,
        }
    }

    /// Convert messages to the chat-completions wire format
    fn to_wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    /// Extract the assistant text from an API response
    fn from_api_response(resp: ApiResponse) -> Result<ChatResponse> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Chat completion had no choices"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!("Model output was truncated at the max_tokens limit");
        }

        let content = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("Chat completion had empty content"))?;

        let usage = resp.usage.map_or(ChatUsage::default(), |u| ChatUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(ChatResponse { content, usage })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        schema: Option<&ResponseSchema>,
    ) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let wire_messages = Self::to_wire_messages(messages);

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": wire_messages,
        });

        if let Some(schema) = schema {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "strict": true,
                    "schema": schema.schema,
                },
            });
        }

        debug!(
            "OpenAI request: model={}, messages={}, structured={}",
            self.model,
            wire_messages.len(),
            schema.is_some()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Chat completion request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        debug!(
            "OpenAI response: choices={}, finish_reason={:?}",
            api_response.choices.len(),
            api_response.choices.first().map(|c| &c.finish_reason)
        );

        Self::from_api_response(api_response)
    }
}

// ── chat-completions wire types ──

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::ChatRole;

    #[test]
    fn test_to_wire_messages() {
        let msgs = vec![
            ChatMessage::system("You are a research assistant."),
            ChatMessage::user("plan searches for rust async"),
        ];
        let wire = OpenAiProvider::to_wire_messages(&msgs);
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[0].content, "You are a research assistant.");
        assert_eq!(wire[1].role, "user");
    }

    #[test]
    fn test_wire_role_for_assistant() {
        let msgs = vec![ChatMessage {
            role: ChatRole::Assistant,
            content: "done".to_string(),
        }];
        let wire = OpenAiProvider::to_wire_messages(&msgs);
        assert_eq!(wire[0].role, "assistant");
    }

    #[test]
    fn test_from_api_response() {
        let resp = ApiResponse {
            choices: vec![ApiChoice {
                message: ApiChoiceMessage {
                    content: Some("summary text".to_string()),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: Some(ApiUsage {
                prompt_tokens: 12,
                completion_tokens: 34,
            }),
        };
        let result = OpenAiProvider::from_api_response(resp).unwrap();
        assert_eq!(result.content, "summary text");
        assert_eq!(result.usage.input_tokens, 12);
        assert_eq!(result.usage.output_tokens, 34);
    }

    #[test]
    fn test_from_api_response_no_choices() {
        let resp = ApiResponse {
            choices: vec![],
            usage: None,
        };
        assert!(OpenAiProvider::from_api_response(resp).is_err());
    }

    #[test]
    fn test_from_api_response_empty_content() {
        let resp = ApiResponse {
            choices: vec![ApiChoice {
                message: ApiChoiceMessage {
                    content: Some(String::new()),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        };
        assert!(OpenAiProvider::from_api_response(resp).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = OpenAiProvider::new(
            "sk-test".to_string(),
            "gpt-4o-mini".to_string(),
            "https://api.openai-proxy.org/v1/".to_string(),
            2048,
        );
        assert_eq!(provider.base_url, "https://api.openai-proxy.org/v1");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let provider = OpenAiProvider::new(
            "sk-secret-key".to_string(),
            "gpt-4o-mini".to_string(),
            "https://api.openai.com/v1".to_string(),
            2048,
        );
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-secret-key"));
    }
}
