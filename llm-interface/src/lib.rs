pub mod client;
pub mod parser;
pub mod prompts;
pub mod types;

use async_trait::async_trait;
use insight_core::CoreError;

pub use client::ChatCompletionClient;
pub use parser::{parse_llm_output, parse_string_list};
pub use types::{ChatRequest, ChatResponse, Message};

/// A completed chat request: the decoded body and the text of its first choice.
#[derive(Debug, Clone)]
pub struct Completion {
    pub response: ChatResponse,
    pub content: String,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Ask `model` to categorize one caption.
    async fn complete(&self, caption: &str, model: &str) -> Result<Completion, CoreError>;
}
