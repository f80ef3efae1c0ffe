//! Session domain model.
//!
//! This module contains the `ChatSession` entity: the explicit, in-memory
//! state of one terminal conversation. It is owned by the application loop
//! and passed by reference into each operation; there are no process-wide
//! singletons.

use super::message::{ConversationMessage, MessageRole};
use crate::repository::{DEFAULT_PERSONA, DEFAULT_SUBJECT};

/// Origin of a session that was resumed from a persisted transcript.
///
/// Kept so that a later save can remove the superseded file: after a
/// successful save-following-resume, at most one on-disk representation of
/// the session exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumedFrom {
    /// Subject directory the transcript was loaded from.
    pub subject: String,
    /// Filename of the loaded transcript.
    pub filename: String,
}

/// The mutable state of one terminal chat session.
///
/// A session tracks:
/// - In-memory conversation history (cleared on persona/subject switch)
/// - The current system prompt sent with every model request
/// - The active persona and subject names
/// - The model used for requests
/// - The transcript this session was resumed from, if any
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Ordered conversation history (user/assistant messages only).
    pub history: Vec<ConversationMessage>,
    /// Full system prompt text sent with each request.
    pub system_prompt: String,
    /// Active persona name, when one has been loaded.
    pub persona: Option<String>,
    /// Active subject name, when one has been loaded.
    pub subject: Option<String>,
    /// Model name used for requests.
    pub model: String,
    /// Set when this session's history was loaded from a persisted
    /// transcript; cleared once the old file has been superseded.
    pub resumed_from: Option<ResumedFrom>,
}

impl ChatSession {
    /// Creates an empty session for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            history: Vec::new(),
            system_prompt: String::new(),
            persona: None,
            subject: None,
            model: model.into(),
            resumed_from: None,
        }
    }

    /// Appends a message to the conversation history.
    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.history.push(ConversationMessage::new(role, content));
    }

    /// Clears the in-memory history and forgets any resume origin.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.resumed_from = None;
    }

    /// Replaces the history with one loaded from a transcript.
    pub fn load_history(&mut self, history: Vec<ConversationMessage>) {
        self.history = history;
    }

    /// Sets the system prompt for subsequent requests.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    /// Records the active persona and subject.
    pub fn set_scope(&mut self, persona: impl Into<String>, subject: impl Into<String>) {
        self.persona = Some(persona.into());
        self.subject = Some(subject.into());
    }

    /// Active persona name, or the default when none has been loaded.
    pub fn persona_or_default(&self) -> &str {
        self.persona.as_deref().unwrap_or(DEFAULT_PERSONA)
    }

    /// Active subject name, or the default when none has been loaded.
    pub fn subject_or_default(&self) -> &str {
        self.subject.as_deref().unwrap_or(DEFAULT_SUBJECT)
    }

    /// Swaps the model used for subsequent requests.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = ChatSession::new("llama3");
        assert!(session.history.is_empty());
        assert_eq!(session.model, "llama3");
        assert_eq!(session.persona_or_default(), DEFAULT_PERSONA);
        assert_eq!(session.subject_or_default(), DEFAULT_SUBJECT);
    }

    #[test]
    fn test_add_and_clear_history() {
        let mut session = ChatSession::new("llama3");
        session.add_message(MessageRole::User, "hi");
        session.add_message(MessageRole::Assistant, "hello");
        assert_eq!(session.history.len(), 2);

        session.resumed_from = Some(ResumedFrom {
            subject: "gardening".to_string(),
            filename: "chat_2025-01-01-10-00.md".to_string(),
        });
        session.clear_history();
        assert!(session.history.is_empty());
        assert!(session.resumed_from.is_none());
    }

    #[test]
    fn test_scope_tracking() {
        let mut session = ChatSession::new("llama3");
        session.set_scope("writer", "space opera");
        assert_eq!(session.persona_or_default(), "writer");
        assert_eq!(session.subject_or_default(), "space opera");
    }
}
