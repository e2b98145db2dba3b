use async_trait::async_trait;
use navigator_common::Result;

use crate::types::ChatRequest;

/// Common trait for chat completion backends
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run one completion and return the model's answer text
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}
