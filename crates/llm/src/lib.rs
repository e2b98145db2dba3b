//! Navigator LLM Integration
//!
//! OpenRouter chat completion client and the use case assistant

mod assistant;
mod chat;
mod client;
mod prompts;
mod types;

pub use assistant::Assistant;
pub use chat::ChatClient;
pub use client::OpenRouterClient;
pub use prompts::{context_block, user_prompt, SYSTEM_PROMPT};
pub use types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChatRole, ResponseMessage};
