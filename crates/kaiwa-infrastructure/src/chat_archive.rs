//! Directory-backed ChatArchive implementation.
//!
//! Transcripts live inside subject directories: timestamped snapshot files
//! plus one optional rolling log per subject. See [`crate::transcript`] for
//! the file format.

use crate::paths::KaiwaPaths;
use crate::transcript::{
    self, ROLLING_LOG_FILENAME, SNAPSHOT_PREFIX, SNAPSHOT_TIMESTAMP_FORMAT,
};
use kaiwa_core::error::{KaiwaError, Result};
use kaiwa_core::repository::{ChatArchive, ChatEntry, SaveMode};
use kaiwa_core::session::ConversationMessage;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Filesystem chat archive rooted at a [`KaiwaPaths`] data directory.
pub struct DirChatArchive {
    paths: KaiwaPaths,
}

impl DirChatArchive {
    /// Creates an archive over the given paths.
    pub fn new(paths: KaiwaPaths) -> Self {
        Self { paths }
    }

    /// Snapshot filenames within one subject directory, filename-sorted.
    async fn snapshot_filenames(&self, subject: &str) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(mut entries) = fs::read_dir(self.paths.subject_dir(subject)).await else {
            return names;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(name) = entry.file_name().to_str() {
                if transcript::is_snapshot_filename(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        names
    }

    async fn read_non_empty(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path).await {
            Ok(content) if !content.trim().is_empty() => Some(content),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl ChatArchive for DirChatArchive {
    async fn list_all(&self) -> Vec<ChatEntry> {
        let mut all = Vec::new();
        let Ok(mut subjects) = fs::read_dir(self.paths.subjects_dir()).await else {
            return all;
        };

        while let Ok(Some(entry)) = subjects.next_entry().await {
            if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let Some(subject) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            for filename in self.snapshot_filenames(&subject).await {
                let path = self.paths.subject_dir(&subject).join(&filename);
                all.push(ChatEntry {
                    subject: subject.clone(),
                    filename,
                    path,
                });
            }
        }

        // Filenames embed the creation timestamp, so this is chronological.
        all.sort_by(|a, b| a.filename.cmp(&b.filename));
        all
    }

    async fn list_by_subject(&self, subject: &str) -> Vec<ChatEntry> {
        let mut chats = Vec::new();
        for filename in self.snapshot_filenames(subject).await {
            let path = self.paths.subject_dir(subject).join(&filename);
            chats.push(ChatEntry {
                subject: subject.to_string(),
                filename,
                path,
            });
        }
        chats
    }

    async fn load(&self, path: &Path) -> Vec<ConversationMessage> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read chat file");
                return Vec::new();
            }
        };

        let messages = transcript::parse_transcript(&content);
        if messages.is_empty() && !content.trim().is_empty() {
            tracing::warn!(path = %path.display(), "chat file has no recognizable role markers");
        }
        messages
    }

    async fn save(
        &self,
        subject: &str,
        messages: &[ConversationMessage],
        mode: SaveMode,
    ) -> Result<PathBuf> {
        let subject_dir = self.paths.subject_dir(subject);
        if !subject_dir.exists() {
            return Err(KaiwaError::not_found("subject", subject));
        }

        let content = transcript::format_transcript(messages);
        let now = chrono::Local::now();

        match mode {
            SaveMode::Snapshot => {
                let timestamp = now.format(SNAPSHOT_TIMESTAMP_FORMAT);
                let log_file = subject_dir.join(format!("{SNAPSHOT_PREFIX}{timestamp}.md"));
                fs::write(&log_file, &content).await.map_err(|e| {
                    KaiwaError::io(format!("Failed to write '{}': {}", log_file.display(), e))
                })?;
                Ok(log_file)
            }
            SaveMode::RollingLog => {
                let log_file = subject_dir.join(ROLLING_LOG_FILENAME);
                let existing = self.read_non_empty(&log_file).await;

                let payload = match existing {
                    Some(mut previous) => {
                        let header = now.format("%Y-%m-%d %H:%M:%S");
                        previous.push_str(&format!("\n---\n# Session {header}\n\n"));
                        previous.push_str(&content);
                        previous
                    }
                    None => content,
                };
                fs::write(&log_file, &payload).await.map_err(|e| {
                    KaiwaError::io(format!("Failed to write '{}': {}", log_file.display(), e))
                })?;
                Ok(log_file)
            }
        }
    }

    async fn delete(&self, subject: &str, filename: &str) -> bool {
        let chat_path = self.paths.subject_dir(subject).join(filename);
        if !chat_path.exists() {
            return false;
        }

        match fs::remove_file(&chat_path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %chat_path.display(), error = %e, "failed to delete chat file");
                false
            }
        }
    }

    async fn move_to_subject(&self, source: &str, filename: &str, target: &str) -> bool {
        let source_path = self.paths.subject_dir(source).join(filename);
        if !source_path.exists() {
            tracing::warn!(source, filename, "chat file not found");
            return false;
        }

        let target_dir = self.paths.subject_dir(target);
        if let Err(e) = fs::create_dir_all(&target_dir).await {
            tracing::warn!(target, error = %e, "failed to create target subject directory");
            return false;
        }

        let content = match fs::read_to_string(&source_path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %source_path.display(), error = %e, "failed to read chat file");
                return false;
            }
        };

        let target_path = target_dir.join(filename);
        if let Err(e) = fs::write(&target_path, &content).await {
            tracing::warn!(path = %target_path.display(), error = %e, "failed to write chat file");
            return false;
        }

        // The source is only removed after the target write succeeded.
        if let Err(e) = fs::remove_file(&source_path).await {
            tracing::warn!(path = %source_path.display(), error = %e, "failed to remove source chat file");
            return false;
        }
        true
    }

    async fn combined_history(&self, subject: &str) -> String {
        let subject_dir = self.paths.subject_dir(subject);
        let mut blocks = Vec::new();

        if let Some(content) = self.read_non_empty(&subject_dir.join(ROLLING_LOG_FILENAME)).await {
            blocks.push(content);
        }

        for filename in self.snapshot_filenames(subject).await {
            if let Some(content) = self.read_non_empty(&subject_dir.join(filename)).await {
                blocks.push(content);
            }
        }

        blocks.join("\n---\n")
    }
}
