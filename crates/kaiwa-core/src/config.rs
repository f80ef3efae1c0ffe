//! Application configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration loaded from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RootConfig {
    /// Model used for requests.
    #[serde(default = "default_model")]
    pub model: String,
    /// Alternate model that `/swap` toggles to.
    #[serde(default = "default_alt_model")]
    pub alt_model: String,
    /// Base URL of the local model endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Whether responses stream token-by-token.
    #[serde(default = "default_streaming")]
    pub streaming: bool,
    /// Override for the data directory holding `personas/` and `subjects/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_alt_model() -> String {
    "qwen2.5-coder".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_streaming() -> bool {
    true
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            alt_model: default_alt_model(),
            endpoint: default_endpoint(),
            streaming: default_streaming(),
            data_dir: None,
        }
    }
}
