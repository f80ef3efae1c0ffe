//! Kaiwa domain layer.
//!
//! Domain models, error taxonomy, store/archive trait contracts, the inline
//! directive parser, the system prompt builder, and the session lifecycle
//! service. This crate performs no I/O of its own; filesystem access lives
//! behind the traits in [`repository`] and is implemented by
//! `kaiwa-infrastructure`.

pub mod config;
pub mod directive;
pub mod error;
pub mod prompt;
pub mod repository;
pub mod session;

// Re-export common error type
pub use error::KaiwaError;
