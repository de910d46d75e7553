// Chat assistant: streaming completions client and prompt text.

pub mod client;
pub mod prompt;

pub use client::{ChatClient, LlmClient};
