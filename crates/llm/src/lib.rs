//! Text completion crate for pdfqa.
//!
//! Provides a provider-agnostic trait for hosted text-completion models and
//! the OpenAI completions implementation used by the answer path.
//!
//! # Example
//! ```no_run
//! use pdfqa_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = LlmRequest::deterministic("Say hello", "gpt-3.5-turbo-instruct", 400);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
