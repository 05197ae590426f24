//! Everything that talks to, or cleans up after, the text-generation service:
//! per-task model configuration, the gateway client, deterministic prompt
//! builders, and lenient response parsing.

pub mod client;
pub mod models;
pub mod parse;
pub mod prompts;

pub use client::{AnthropicClient, Gateway, GatewayError};
pub use models::PromptKind;
pub use parse::ParseError;
