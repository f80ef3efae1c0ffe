//! First-run seeding of the default persona and subject.
//!
//! The default persona and the default subject must always exist: every
//! fallback path and the startup prompt build depend on them. This module
//! creates them with seed content when missing, so a fresh installation
//! works immediately and an existing one is left untouched.

use crate::paths::KaiwaPaths;
use kaiwa_core::error::{KaiwaError, Result};
use kaiwa_core::repository::{DEFAULT_PERSONA, DEFAULT_SUBJECT};
use tokio::fs;

const DEFAULT_PERSONA_SEED: &str = "\
You are a helpful, knowledgeable assistant. Answer clearly and concisely,
and say so when you are unsure rather than guessing.
";

const DEFAULT_SUBJECT_SEED: &str = "\
# no_subject Instructions

General conversation with no particular subject. Do not assume any prior
context beyond the current session.
";

/// Ensures the data layout exists: the `personas/` and `subjects/`
/// directories, the default persona file, and the default subject directory
/// with its instructions file.
///
/// Idempotent: existing files are never overwritten.
pub async fn ensure_defaults(paths: &KaiwaPaths) -> Result<()> {
    fs::create_dir_all(paths.personas_dir())
        .await
        .map_err(|e| KaiwaError::io(format!("Failed to create personas directory: {e}")))?;

    let default_persona = paths.persona_file(DEFAULT_PERSONA);
    if !default_persona.exists() {
        tracing::info!(path = %default_persona.display(), "seeding default persona");
        fs::write(&default_persona, DEFAULT_PERSONA_SEED)
            .await
            .map_err(|e| KaiwaError::io(format!("Failed to seed default persona: {e}")))?;
    }

    let default_subject_dir = paths.subject_dir(DEFAULT_SUBJECT);
    fs::create_dir_all(&default_subject_dir)
        .await
        .map_err(|e| KaiwaError::io(format!("Failed to create default subject directory: {e}")))?;

    let default_instructions = paths.instructions_file(DEFAULT_SUBJECT);
    if !default_instructions.exists() {
        tracing::info!(path = %default_instructions.display(), "seeding default subject instructions");
        fs::write(&default_instructions, DEFAULT_SUBJECT_SEED)
            .await
            .map_err(|e| KaiwaError::io(format!("Failed to seed default subject: {e}")))?;
    }

    Ok(())
}
