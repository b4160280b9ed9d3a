//! LLM provider abstraction
//!
//! Providers implement the [`LlmProvider`] trait. Today that is the
//! OpenAI-compatible chat-completions client; anything speaking the same
//! protocol (proxies, local relays) plugs in through the base URL.

pub mod openai;
pub mod types;

pub use openai::OpenAiProvider;
pub use types::{ChatMessage, ChatResponse, ChatRole, ChatUsage, LlmProvider, ResponseSchema};
