//! OpenAI-compatible chat completions.
//!
//! Works against OpenAI itself and any gateway that speaks the same protocol.
//! The default base URL is OpenRouter's, which also reads the `HTTP-Referer`
//! and `X-Title` headers to attribute traffic to the application.

mod client;
mod completion;

pub use client::{DEFAULT_REFERER, OPENROUTER_API_BASE_URL, OpenAIClient, OpenAIClientBuilder};
pub use completion::CompletionModel;
