use navigator_common::{AppConfig, NavigatorError, Result};
use navigator_data::UseCaseRecord;
use std::sync::Arc;
use tracing::info;

use crate::chat::ChatClient;
use crate::prompts::{user_prompt, SYSTEM_PROMPT};
use crate::types::{ChatMessage, ChatRequest};

/// Answers questions about AI use cases with retrieved records as context
pub struct Assistant {
    client: Arc<dyn ChatClient>,
    model: String,
    temperature: f32,
}

impl Assistant {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(client: Arc<dyn ChatClient>, config: &AppConfig) -> Self {
        Self::new(
            client,
            config.assistant_model.clone(),
            config.assistant_temperature,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the chat model, grounding it in `context`
    pub async fn answer(&self, question: &str, context: &[&UseCaseRecord]) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(NavigatorError::invalid_input("question must not be empty"));
        }

        info!(
            "Assistant question ({} chars) with {} context records",
            question.len(),
            context.len()
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt(question, context)),
            ],
            temperature: Some(self.temperature),
        };

        let answer = self.client.complete(request).await?;
        Ok(answer.trim().to_string())
    }
}
