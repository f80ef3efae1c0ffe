//! Directory-backed SubjectStore implementation.
//!
//! One subject = one directory under `subjects/`, holding an `instructions`
//! file and the subject's transcripts.

use crate::paths::KaiwaPaths;
use kaiwa_core::error::{KaiwaError, Result};
use kaiwa_core::repository::{RetrievedInstructions, SubjectStore, DEFAULT_SUBJECT};
use std::path::PathBuf;
use tokio::fs;

/// Filesystem subject store rooted at a [`KaiwaPaths`] data directory.
pub struct DirSubjectStore {
    paths: KaiwaPaths,
}

impl DirSubjectStore {
    /// Creates a store over the given paths.
    pub fn new(paths: KaiwaPaths) -> Self {
        Self { paths }
    }

    async fn read_file(&self, path: &PathBuf) -> Result<String> {
        fs::read_to_string(path).await.map_err(|e| {
            KaiwaError::io(format!("Failed to read '{}': {}", path.display(), e))
        })
    }
}

#[async_trait::async_trait]
impl SubjectStore for DirSubjectStore {
    async fn load_instructions(&self, name: Option<&str>) -> Result<RetrievedInstructions> {
        let name = name.unwrap_or(DEFAULT_SUBJECT);

        let instructions_file = self.paths.instructions_file(name);
        if instructions_file.exists() {
            return Ok(RetrievedInstructions::exact(
                self.read_file(&instructions_file).await?,
            ));
        }

        if name != DEFAULT_SUBJECT {
            let default_file = self.paths.instructions_file(DEFAULT_SUBJECT);
            if default_file.exists() {
                tracing::warn!(subject = name, "subject not found, using default");
                return Ok(RetrievedInstructions::fallback(
                    self.read_file(&default_file).await?,
                    name,
                ));
            }
        }

        Err(KaiwaError::not_found("subject", name))
    }

    async fn update_instructions(&self, name: &str, instructions: &str) -> bool {
        let instructions_file = self.paths.instructions_file(name);

        if !instructions_file.exists() {
            return false;
        }

        match fs::write(&instructions_file, instructions).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(subject = name, error = %e, "failed to update subject instructions");
                false
            }
        }
    }

    async fn create(&self, name: &str) -> bool {
        let subject_dir = self.paths.subject_dir(name);
        if subject_dir.exists() {
            return false;
        }

        match fs::create_dir_all(&subject_dir).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(subject = name, error = %e, "failed to create subject directory");
                false
            }
        }
    }

    async fn save_instructions(&self, name: &str, instructions: &str) -> Result<PathBuf> {
        let subject_dir = self.paths.subject_dir(name);
        fs::create_dir_all(&subject_dir).await.map_err(|e| {
            KaiwaError::io(format!(
                "Failed to create subject directory '{}': {}",
                subject_dir.display(),
                e
            ))
        })?;

        let instructions_file = self.paths.instructions_file(name);
        let content = format!("# {name} Instructions\n\n{instructions}");
        fs::write(&instructions_file, content).await.map_err(|e| {
            KaiwaError::io(format!(
                "Failed to write '{}': {}",
                instructions_file.display(),
                e
            ))
        })?;
        Ok(instructions_file)
    }

    async fn delete(&self, name: &str) -> bool {
        if name == DEFAULT_SUBJECT {
            tracing::warn!("default subject cannot be deleted");
            return false;
        }

        let subject_dir = self.paths.subject_dir(name);
        if !subject_dir.exists() {
            return false;
        }

        match fs::remove_dir_all(&subject_dir).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(subject = name, error = %e, "failed to delete subject");
                false
            }
        }
    }

    async fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(mut entries) = fs::read_dir(self.paths.subjects_dir()).await else {
            return names;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        names
    }

    async fn exists(&self, name: &str) -> bool {
        self.paths.subject_dir(name).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store_with_default(temp: &TempDir) -> DirSubjectStore {
        let paths = KaiwaPaths::new(temp.path());
        let store = DirSubjectStore::new(paths);
        store
            .save_instructions(DEFAULT_SUBJECT, "General conversation.")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_save_and_load_instructions() {
        let temp = TempDir::new().unwrap();
        let store = store_with_default(&temp).await;

        store
            .save_instructions("gardening", "We talk about plants.")
            .await
            .unwrap();
        let loaded = store.load_instructions(Some("gardening")).await.unwrap();
        assert_eq!(
            loaded.content,
            "# gardening Instructions\n\nWe talk about plants."
        );
        assert_eq!(loaded.fallback, None);
    }

    #[tokio::test]
    async fn test_missing_subject_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let store = store_with_default(&temp).await;

        let loaded = store.load_instructions(Some("ghost")).await.unwrap();
        assert_eq!(loaded.fallback.as_deref(), Some("ghost"));
        assert!(loaded.content.contains("General conversation."));
    }

    #[tokio::test]
    async fn test_missing_default_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = DirSubjectStore::new(KaiwaPaths::new(temp.path()));
        let err = store.load_instructions(None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_is_idempotent_safe() {
        let temp = TempDir::new().unwrap();
        let store = DirSubjectStore::new(KaiwaPaths::new(temp.path()));

        assert!(store.create("gardening").await);
        // Already exists: false, not an error.
        assert!(!store.create("gardening").await);
        assert!(store.exists("gardening").await);
    }

    #[tokio::test]
    async fn test_update_never_creates() {
        let temp = TempDir::new().unwrap();
        let store = DirSubjectStore::new(KaiwaPaths::new(temp.path()));

        store.create("gardening").await;
        // Directory exists but instructions file does not.
        assert!(!store.update_instructions("gardening", "text").await);

        store.save_instructions("gardening", "old").await.unwrap();
        assert!(store.update_instructions("gardening", "new").await);
        let loaded = store.load_instructions(Some("gardening")).await.unwrap();
        assert_eq!(loaded.content, "new");
    }

    #[tokio::test]
    async fn test_delete_default_always_false() {
        let temp = TempDir::new().unwrap();
        let store = store_with_default(&temp).await;

        assert!(!store.delete(DEFAULT_SUBJECT).await);
        assert!(store.exists(DEFAULT_SUBJECT).await);
        assert!(!store.delete("ghost").await);
    }

    #[tokio::test]
    async fn test_delete_removes_recursively() {
        let temp = TempDir::new().unwrap();
        let store = store_with_default(&temp).await;

        store.save_instructions("gardening", "plants").await.unwrap();
        let chat = KaiwaPaths::new(temp.path())
            .subject_dir("gardening")
            .join("chat_2025-01-01-10-00.md");
        fs::write(&chat, "**User:**\nhi\n").await.unwrap();

        assert!(store.delete("gardening").await);
        assert!(!store.exists("gardening").await);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = DirSubjectStore::new(KaiwaPaths::new(temp.path()));
        assert!(store.list().await.is_empty());
    }
}
