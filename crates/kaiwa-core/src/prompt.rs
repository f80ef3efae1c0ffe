//! System prompt assembly.
//!
//! The system prompt is derived, never stored: persona content, then subject
//! instructions, then (for an explicitly chosen non-default subject) the
//! accumulated transcript history. Instructions plus history become part of
//! every request's system context, giving a subject the illusion of
//! long-term memory without true retrieval.

use crate::error::Result;
use crate::repository::{ChatArchive, PersonaStore, SubjectStore, DEFAULT_SUBJECT};
use std::sync::Arc;

/// A built system prompt together with any fallback warnings accumulated
/// while resolving the persona and subject.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    /// The assembled system prompt text.
    pub text: String,
    /// Human-readable fallback notices ("persona 'x' not found, using
    /// default"), in resolution order.
    pub warnings: Vec<String>,
}

/// Composes persona and subject instructions (and optionally transcript
/// history) into a single system prompt string.
pub struct PromptBuilder {
    personas: Arc<dyn PersonaStore>,
    subjects: Arc<dyn SubjectStore>,
    archive: Arc<dyn ChatArchive>,
}

impl PromptBuilder {
    /// Creates a builder over the given store backends.
    pub fn new(
        personas: Arc<dyn PersonaStore>,
        subjects: Arc<dyn SubjectStore>,
        archive: Arc<dyn ChatArchive>,
    ) -> Self {
        Self {
            personas,
            subjects,
            archive,
        }
    }

    /// Builds the full system prompt for the given scope.
    ///
    /// Transcript history is appended if and only if `subject` was
    /// explicitly supplied and is not the default subject: the default
    /// channel deliberately carries no history, which keeps its prompt from
    /// growing without bound.
    ///
    /// The output is deterministic: byte-identical across calls while the
    /// backing files are unchanged.
    pub async fn build(
        &self,
        persona: Option<&str>,
        subject: Option<&str>,
    ) -> Result<BuiltPrompt> {
        let mut warnings = Vec::new();

        let persona_instructions = self.personas.load(persona).await?;
        if let Some(requested) = &persona_instructions.fallback {
            warnings.push(format!("Persona '{requested}' not found, using default"));
        }

        let subject_instructions = self.subjects.load_instructions(subject).await?;
        if let Some(requested) = &subject_instructions.fallback {
            warnings.push(format!("Subject '{requested}' not found, using default"));
        }

        let mut text = format!(
            "# Persona\n{}\n\n# Subject Instructions\n{}",
            persona_instructions.content, subject_instructions.content
        );

        if let Some(subject) = subject {
            if subject != DEFAULT_SUBJECT {
                let history = self.archive.combined_history(subject).await;
                if !history.is_empty() {
                    text.push_str("\n\n# Previous Chat History\n");
                    text.push_str(&history);
                }
            }
        }

        Ok(BuiltPrompt { text, warnings })
    }
}
