//! Session lifecycle service.
//!
//! `SessionService` coordinates the store backends for the operations that
//! mutate a [`ChatSession`]: switching persona/subject scope, resuming a
//! persisted transcript, and saving the session back to disk.
//!
//! A session's relationship to its transcripts moves from unloaded to
//! loaded to modified to saved; when a session that was resumed from a file
//! is saved again, the superseded file is removed so at most one on-disk
//! representation of the session remains.

use super::model::{ChatSession, ResumedFrom};
use crate::error::Result;
use crate::prompt::PromptBuilder;
use crate::repository::{
    ChatArchive, ChatEntry, PersonaStore, SaveMode, SubjectStore, DEFAULT_PERSONA,
};
use std::sync::Arc;

/// The resolved outcome of a scope switch.
#[derive(Debug, Clone)]
pub struct ScopeReport {
    /// The persona actually loaded (after fallback).
    pub persona: String,
    /// The subject actually loaded (after fallback).
    pub subject: String,
    /// Requested persona that was missing, when the default was substituted.
    pub missing_persona: Option<String>,
    /// Requested subject that was missing, when the default was substituted.
    pub missing_subject: Option<String>,
}

/// The outcome of persisting a session.
#[derive(Debug, Clone)]
pub struct PersistOutcome {
    /// Path of the transcript that was written.
    pub path: std::path::PathBuf,
    /// Filename of the resumed transcript that was removed, if any.
    pub removed_previous: Option<String>,
}

/// Coordinates scope switching, transcript resume, and session persistence
/// over the store backends.
pub struct SessionService {
    personas: Arc<dyn PersonaStore>,
    subjects: Arc<dyn SubjectStore>,
    archive: Arc<dyn ChatArchive>,
    prompt: PromptBuilder,
}

impl SessionService {
    /// Creates a service over the given backends.
    pub fn new(
        personas: Arc<dyn PersonaStore>,
        subjects: Arc<dyn SubjectStore>,
        archive: Arc<dyn ChatArchive>,
    ) -> Self {
        let prompt = PromptBuilder::new(
            Arc::clone(&personas),
            Arc::clone(&subjects),
            Arc::clone(&archive),
        );
        Self {
            personas,
            subjects,
            archive,
            prompt,
        }
    }

    /// Access to the prompt builder for callers that only need assembly.
    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt
    }

    /// Switches the session to a new persona/subject scope.
    ///
    /// Unspecified fields keep the session's current value (or the default
    /// when nothing has been loaded yet). A requested persona or subject
    /// that does not exist on disk resolves to the default, reported through
    /// the returned [`ScopeReport`]. The system prompt is rebuilt for the
    /// resolved scope and the in-memory history is cleared.
    pub async fn activate(
        &self,
        session: &mut ChatSession,
        persona: Option<String>,
        subject: Option<String>,
    ) -> Result<ScopeReport> {
        let target_persona = persona.unwrap_or_else(|| session.persona_or_default().to_string());
        let target_subject = subject.unwrap_or_else(|| session.subject_or_default().to_string());

        let mut missing_persona = None;
        let mut actual_persona = target_persona.clone();
        if !self.personas.exists(&target_persona).await {
            missing_persona = Some(target_persona);
            actual_persona = DEFAULT_PERSONA.to_string();
        }

        let mut missing_subject = None;
        let mut actual_subject = target_subject.clone();
        if !self.subjects.exists(&target_subject).await {
            missing_subject = Some(target_subject);
            actual_subject = crate::repository::DEFAULT_SUBJECT.to_string();
        }

        let built = self
            .prompt
            .build(Some(actual_persona.as_str()), Some(actual_subject.as_str()))
            .await?;
        session.set_system_prompt(built.text);
        session.set_scope(actual_persona.clone(), actual_subject.clone());
        session.clear_history();

        Ok(ScopeReport {
            persona: actual_persona,
            subject: actual_subject,
            missing_persona,
            missing_subject,
        })
    }

    /// Rebuilds the session's system prompt for its current scope, e.g.
    /// after instructions were updated on disk.
    pub async fn rebuild_prompt(&self, session: &mut ChatSession) -> Result<()> {
        let built = self
            .prompt
            .build(
                Some(session.persona_or_default()),
                Some(session.subject_or_default()),
            )
            .await?;
        session.set_system_prompt(built.text);
        Ok(())
    }

    /// Loads a persisted transcript into the session and re-scopes it to the
    /// transcript's subject (under the default persona).
    ///
    /// Returns the number of messages loaded; zero means the file was empty
    /// or could not be parsed and the session is left untouched.
    pub async fn resume(&self, session: &mut ChatSession, entry: &ChatEntry) -> Result<usize> {
        let messages = self.archive.load(&entry.path).await;
        if messages.is_empty() {
            return Ok(0);
        }

        let count = messages.len();
        let built = self
            .prompt
            .build(Some(DEFAULT_PERSONA), Some(entry.subject.as_str()))
            .await?;
        session.set_system_prompt(built.text);
        session.set_scope(DEFAULT_PERSONA, entry.subject.clone());
        session.load_history(messages);
        session.resumed_from = Some(ResumedFrom {
            subject: entry.subject.clone(),
            filename: entry.filename.clone(),
        });
        Ok(count)
    }

    /// Persists the session's history under its current subject.
    ///
    /// When the session was resumed from a transcript, the superseded file
    /// is removed once the new one is on disk, unless the save landed on
    /// the very same file (a rolling-log resave).
    pub async fn persist(
        &self,
        session: &mut ChatSession,
        mode: SaveMode,
    ) -> Result<PersistOutcome> {
        let subject = session.subject_or_default().to_string();
        let path = self.archive.save(&subject, &session.history, mode).await?;

        let mut removed_previous = None;
        if let Some(origin) = session.resumed_from.take() {
            let written_filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let same_file = origin.subject == subject && origin.filename == written_filename;
            if !same_file && self.archive.delete(&origin.subject, &origin.filename).await {
                removed_previous = Some(origin.filename);
            }
        }

        Ok(PersistOutcome {
            path,
            removed_previous,
        })
    }
}
