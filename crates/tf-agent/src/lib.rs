//! # tf-agent
//!
//! The generation/fixer oracle backed by the Anthropic Messages API.
//!
//! [`ClaudeAgent`] implements [`tf_core::FixerOracle`]: initial test
//! generation, static-error repair, test-failure repair, and example
//! selection. Responses are coerced toward bare code by prefilling the
//! assistant turn with an opening code fence and stripping fences from
//! the reply; the "code only, no prose" contract is assumed, not
//! enforced. Every prompt/response pair is mirrored to the prompt
//! logger for offline inspection.

pub mod agent;
pub mod client;
pub mod logger;
pub mod prompts;

pub use agent::ClaudeAgent;
pub use client::{ClaudeClient, ClaudeConfig, Message, Role};
pub use logger::PromptLogger;
pub use prompts::strip_code_fences;
