//! Model-assisted features layered on the deterministic rules in
//! `homestead-core`.
//!
//! Every scoring entry point takes an optional [`TextGenerator`]. When it is
//! `None`, or the provider fails in any way, the rule-based result is
//! returned on its own and tagged `source = rules`.

pub mod client;
pub mod compliance;
pub mod content;
pub mod fraud;
pub mod lead;
pub mod receptionist;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{AiConfig, AiError, ChatMessage, OpenAiClient, TextGenerator};
