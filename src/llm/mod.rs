//! LLM integration module
//!
//! This module provides the trait-based LLM provider abstraction, the OpenAI
//! implementation and the bridge that turns plain-language requests into SQL.

pub mod bridge;
pub mod client;
pub mod provider;

// Provider implementations
pub mod providers {
    pub mod openai;
}

// Re-exports
pub use bridge::SqlBridge;
pub use provider::{GenerationParams, LLMProvider, LLMResponse, Message, MessageRole};
