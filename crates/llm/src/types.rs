use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat completion conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
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

/// Chat completion request (OpenAI-compatible body)
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name (e.g., "mistralai/mistral-7b-instruct")
    pub model: String,

    /// Conversation, system prompt first
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

/// Message returned by the model; `content` may be null
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if any
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "mistralai/mistral-7b-instruct".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            temperature: Some(0.7),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "mistralai/mistral-7b-instruct");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_response_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Answer"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_content().as_deref(), Some("Answer"));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(empty.into_content().is_none());

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(null.into_content().is_none());
    }
}
