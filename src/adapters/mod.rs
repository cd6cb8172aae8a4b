//! Adapters implementing the language model and search ports.

pub mod llm;
pub mod search;
