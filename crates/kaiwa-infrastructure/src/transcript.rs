//! Markdown transcript codec.
//!
//! Transcripts serialize each message as a bolded role header followed by
//! its content and a blank line:
//!
//! ```text
//! **User:**
//! hello
//!
//! **Assistant:**
//! hi there
//! ```
//!
//! Parsing scans trimmed lines case-insensitively for `**User:**` /
//! `**Assistant:**` markers; all lines following a marker, up to the next
//! marker or end of file, become that message's content (trimmed of leading
//! and trailing blank lines). Lines before any marker are discarded, and a
//! transcript with no markers parses to an empty sequence.

use kaiwa_core::session::{ConversationMessage, MessageRole};

/// Fixed filename of the rolling log within a subject directory.
pub const ROLLING_LOG_FILENAME: &str = "chatlog.md";

/// Filename prefix of timestamped snapshot transcripts.
pub const SNAPSHOT_PREFIX: &str = "chat_";

/// Timestamp format embedded in snapshot filenames.
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// Whether a filename names a transcript file (snapshot only; the rolling
/// log is handled separately where it matters).
pub fn is_snapshot_filename(name: &str) -> bool {
    name.starts_with(SNAPSHOT_PREFIX) && name.ends_with(".md") && name != ROLLING_LOG_FILENAME
}

/// Formats a message sequence as transcript markdown.
pub fn format_transcript(messages: &[ConversationMessage]) -> String {
    let formatted: Vec<String> = messages
        .iter()
        .map(|msg| format!("**{}:**\n{}\n", msg.role.display_name(), msg.content))
        .collect();
    formatted.join("\n")
}

fn role_marker(line: &str) -> Option<MessageRole> {
    let trimmed = line.trim().to_lowercase();
    if trimmed.starts_with("**user:**") {
        Some(MessageRole::User)
    } else if trimmed.starts_with("**assistant:**") {
        Some(MessageRole::Assistant)
    } else {
        None
    }
}

/// Parses transcript markdown into its message sequence.
///
/// Tolerant by contract: content with no recognizable role markers yields an
/// empty sequence rather than a partial or garbled one.
pub fn parse_transcript(content: &str) -> Vec<ConversationMessage> {
    let mut messages = Vec::new();
    let mut current_role: Option<MessageRole> = None;
    let mut current_content: Vec<&str> = Vec::new();

    let mut flush =
        |role: Option<MessageRole>, content: &mut Vec<&str>, messages: &mut Vec<ConversationMessage>| {
            if let Some(role) = role {
                let text = content.join("\n");
                let text = text.trim();
                if !text.is_empty() {
                    messages.push(ConversationMessage::new(role, text));
                }
            }
            content.clear();
        };

    for line in content.lines() {
        if let Some(role) = role_marker(line) {
            flush(current_role, &mut current_content, &mut messages);
            current_role = Some(role);
        } else if current_role.is_some() {
            current_content.push(line);
        }
    }
    flush(current_role, &mut current_content, &mut messages);

    messages
}
