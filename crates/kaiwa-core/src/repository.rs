//! Store and archive trait contracts.
//!
//! These traits define the persistence interface for personas, subjects,
//! and chat transcripts, decoupling the domain layer from the filesystem
//! implementation in `kaiwa-infrastructure`.
//!
//! # Error contract
//!
//! Loads return `Err(KaiwaError::NotFound)` only when no fallback content
//! exists. Mutating operations (update/create/delete/move) return booleans:
//! a write failure is a `false` with the cause logged by the implementation,
//! never a raised error, so callers decide on user messaging.

use crate::error::Result;
use crate::session::message::ConversationMessage;
use std::path::{Path, PathBuf};

/// Name of the distinguished persona that always exists and is protected
/// from deletion and in-place editing.
pub const DEFAULT_PERSONA: &str = "default";

/// Name of the distinguished "no subject" subject that always exists and is
/// protected from deletion.
pub const DEFAULT_SUBJECT: &str = "no_subject";

/// Instruction content resolved by a store, with the fallback side channel.
///
/// When the requested persona/subject was missing and the default's content
/// was substituted, `fallback` carries the name that was requested. This is
/// a soft condition, not an error: processing continues with the substituted
/// content and the caller decides how to surface the warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedInstructions {
    /// The instruction text that was loaded.
    pub content: String,
    /// The requested name, when the default was silently substituted for it.
    pub fallback: Option<String>,
}

impl RetrievedInstructions {
    /// Content loaded from the entry that was actually requested.
    pub fn exact(content: String) -> Self {
        Self {
            content,
            fallback: None,
        }
    }

    /// Default content substituted for a missing entry.
    pub fn fallback(content: String, requested: impl Into<String>) -> Self {
        Self {
            content,
            fallback: Some(requested.into()),
        }
    }
}

/// A transcript file discovered by the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// Subject directory the transcript lives under.
    pub subject: String,
    /// Transcript file name (encodes the creation timestamp).
    pub filename: String,
    /// Full path to the transcript file.
    pub path: PathBuf,
}

/// Write mode for persisting a chat session.
///
/// The rolling log and the timestamped snapshots are two modes of one save
/// operation so that the resumed-session lifecycle (delete-old-on-resave)
/// stays a single invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Create a new timestamped `chat_<timestamp>.md` file.
    Snapshot,
    /// Append to the fixed rolling `chatlog.md` file, creating it if absent.
    RollingLog,
}

/// Persistence contract for persona instruction files.
#[async_trait::async_trait]
pub trait PersonaStore: Send + Sync {
    /// Loads persona instructions.
    ///
    /// With `name` omitted, loads the default persona. A missing non-default
    /// persona falls back to the default's content (reported through
    /// [`RetrievedInstructions::fallback`]); if even the default file is
    /// absent this fails with `NotFound`.
    async fn load(&self, name: Option<&str>) -> Result<RetrievedInstructions>;

    /// Overwrites instructions for an existing persona.
    ///
    /// Never creates: returns `false` when the persona file is absent or the
    /// write fails.
    async fn update(&self, name: &str, instructions: &str) -> bool;

    /// Creates a new persona file with the given instructions.
    ///
    /// Fails with an error if the persona already exists or the write fails.
    async fn create(&self, name: &str, instructions: &str) -> Result<PathBuf>;

    /// Deletes a persona file.
    ///
    /// Returns `false` when `name` is the default persona, the file is
    /// absent, or the removal fails.
    async fn delete(&self, name: &str) -> bool;

    /// Lists all persona names. Empty when the backing directory is missing.
    async fn list(&self) -> Vec<String>;

    /// Whether a persona file exists for `name`.
    async fn exists(&self, name: &str) -> bool;
}

/// Persistence contract for subject directories and their instructions.
#[async_trait::async_trait]
pub trait SubjectStore: Send + Sync {
    /// Loads a subject's instructions file.
    ///
    /// Same fallback contract as [`PersonaStore::load`], scoped to subject
    /// instruction files.
    async fn load_instructions(&self, name: Option<&str>) -> Result<RetrievedInstructions>;

    /// Overwrites instructions for an existing subject.
    ///
    /// Never creates: returns `false` when the instructions file is absent
    /// or the write fails.
    async fn update_instructions(&self, name: &str, instructions: &str) -> bool;

    /// Creates a new subject directory.
    ///
    /// Returns `false` without error when the subject already exists
    /// (creation is idempotent-safe) or when the directory cannot be made.
    async fn create(&self, name: &str) -> bool;

    /// Creates the subject directory if missing and writes its instructions
    /// file, overwriting any previous content.
    async fn save_instructions(&self, name: &str, instructions: &str) -> Result<PathBuf>;

    /// Recursively deletes a subject directory and all its transcripts.
    ///
    /// Returns `false` when `name` is the default subject, the directory is
    /// absent, or the removal fails.
    async fn delete(&self, name: &str) -> bool;

    /// Lists all subject names. Empty when the backing directory is missing.
    async fn list(&self) -> Vec<String>;

    /// Whether a subject directory exists for `name`.
    async fn exists(&self, name: &str) -> bool;
}

/// Persistence contract for chat transcript files.
#[async_trait::async_trait]
pub trait ChatArchive: Send + Sync {
    /// Lists all transcript files across all subjects, sorted by filename
    /// (which embeds the creation timestamp, giving chronological order).
    ///
    /// Never fails: a missing subjects directory yields an empty list.
    async fn list_all(&self) -> Vec<ChatEntry>;

    /// Lists transcript files for one subject, sorted by filename.
    async fn list_by_subject(&self, subject: &str) -> Vec<ChatEntry>;

    /// Parses a transcript file into its message sequence.
    ///
    /// Returns an empty sequence on read or parse failure rather than
    /// raising; the implementation logs the condition.
    async fn load(&self, path: &Path) -> Vec<ConversationMessage>;

    /// Persists a message sequence under a subject.
    ///
    /// Fails with `NotFound` when the subject directory does not exist.
    /// Returns the path of the written file.
    async fn save(
        &self,
        subject: &str,
        messages: &[ConversationMessage],
        mode: SaveMode,
    ) -> Result<PathBuf>;

    /// Deletes one transcript file. `false` when absent or removal fails.
    async fn delete(&self, subject: &str, filename: &str) -> bool;

    /// Moves a transcript into another subject (created if absent) under the
    /// same filename. The source is only removed after the target write
    /// succeeds; returns `false` when the source is missing or any I/O step
    /// fails.
    async fn move_to_subject(&self, source: &str, filename: &str, target: &str) -> bool;

    /// Concatenates all persisted transcripts for a subject into one string:
    /// the rolling log first (when present and non-empty), then every
    /// timestamped transcript in filename order, blocks separated by `---`.
    /// Empty when the subject has no non-empty transcripts.
    async fn combined_history(&self, subject: &str) -> String;
}
