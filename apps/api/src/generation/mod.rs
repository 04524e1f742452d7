//! Prompt-chain generation: typed stages, prompt templates, the post-request
//! workflow, and its HTTP handlers.

pub mod chain;
pub mod handlers;
pub mod prompts;
pub mod workflow;
