//! Kaiwa model interaction layer.
//!
//! The chat collaborator: a thin agent over the local Ollama HTTP endpoint
//! with blocking and streaming request paths.

pub mod ollama_agent;

pub use ollama_agent::{AgentError, OllamaAgent, TokenStream};
