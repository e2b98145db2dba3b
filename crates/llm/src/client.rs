use async_trait::async_trait;
use navigator_common::{AppConfig, NavigatorError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::chat::ChatClient;
use crate::types::{ChatRequest, ChatResponse};

const MAX_RETRIES: u32 = 3;

/// OpenRouter chat completion client
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    /// First backoff; doubles on every further attempt
    retry_delay: Duration,
}

impl OpenRouterClient {
    /// Create new client; a missing key only fails at completion time
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| NavigatorError::network(format!("failed to create HTTP client: {}", e)))?;

        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            warn!("No assistant API key configured; the assistant is disabled");
        }

        info!("Chat client initialized: {}", base_url);
        Ok(Self {
            base_url,
            api_key,
            client,
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.openrouter_base_url.clone(),
            config.api_key().map(str::to_string),
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Single attempt; transient failures come back as `Network` errors
    async fn try_complete(&self, api_key: &str, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| NavigatorError::network(format!("failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("chat API returned {}", status);
            return Err(if is_transient(status) {
                NavigatorError::network(message)
            } else {
                NavigatorError::llm(message)
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| NavigatorError::llm(format!("failed to parse response: {}", e)))?;

        body.into_content()
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| NavigatorError::llm("empty response from chat API"))
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    /// Complete with retry (1s, 2s backoff) on transient failures
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| NavigatorError::config("assistant API key not configured"))?;

        debug!(
            "Sending chat request - Model: {}, Messages: {}",
            request.model,
            request.messages.len()
        );

        let mut attempt = 1;
        loop {
            match self.try_complete(api_key, &request).await {
                Ok(answer) => {
                    debug!("Received chat response - Length: {}", answer.len());
                    return Ok(answer);
                }
                Err(e @ NavigatorError::Network(_)) if attempt < MAX_RETRIES => {
                    let delay = self.retry_delay * 2u32.pow(attempt - 1);
                    warn!(
                        "Chat request failed (attempt {}/{}): {}. Retrying in {:?}...",
                        attempt, MAX_RETRIES, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
