//! Topic-relevant text extraction via the LLM API.

use crate::error::Result;
use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use tracing::debug;

/// Cap on cleaned page text submitted to the model, in bytes.
pub const MAX_PAGE_TEXT_BYTES: usize = 60_000;

/// Trait for extraction clients (to allow mocking).
#[async_trait]
pub trait TopicExtractor: Send + Sync {
    /// Reduce cleaned page text to the parts relevant to `topic`.
    async fn extract(&self, text: &str, topic: &str) -> Result<String>;
}

/// Production extractor backed by the OpenAI chat completions API.
pub struct OpenAiExtractor {
    client: OpenAIClient,
    model: String,
}

impl OpenAiExtractor {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn system_prompt(topic: &str) -> String {
        format!(
            "Extract the content relevant to {topic}. \
             Keep the original language. \
             Return plain text only, with no markup or commentary."
        )
    }
}

#[async_trait]
impl TopicExtractor for OpenAiExtractor {
    async fn extract(&self, text: &str, topic: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(Self::system_prompt(topic)))
            .message(Message::user(text))
            .max_tokens(1000);

        let response = self.client.chat_completion(request).await?;
        let extracted = openai_client::strip_code_blocks(&response.content).to_string();

        debug!(
            topic = %topic,
            input_bytes = text.len(),
            output_bytes = extracted.len(),
            "Extraction completed"
        );

        Ok(extracted)
    }
}
