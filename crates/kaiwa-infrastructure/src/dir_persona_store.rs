//! Directory-backed PersonaStore implementation.
//!
//! One persona = one markdown file under `personas/`, named by the
//! lowercased persona name.

use crate::paths::KaiwaPaths;
use kaiwa_core::error::{KaiwaError, Result};
use kaiwa_core::repository::{PersonaStore, RetrievedInstructions, DEFAULT_PERSONA};
use std::path::PathBuf;
use tokio::fs;

/// Filesystem persona store rooted at a [`KaiwaPaths`] data directory.
pub struct DirPersonaStore {
    paths: KaiwaPaths,
}

impl DirPersonaStore {
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
impl PersonaStore for DirPersonaStore {
    async fn load(&self, name: Option<&str>) -> Result<RetrievedInstructions> {
        let name = name.unwrap_or(DEFAULT_PERSONA);

        let persona_file = self.paths.persona_file(name);
        if persona_file.exists() {
            return Ok(RetrievedInstructions::exact(
                self.read_file(&persona_file).await?,
            ));
        }

        if !name.eq_ignore_ascii_case(DEFAULT_PERSONA) {
            let default_file = self.paths.persona_file(DEFAULT_PERSONA);
            if default_file.exists() {
                tracing::warn!(persona = name, "persona not found, using default");
                return Ok(RetrievedInstructions::fallback(
                    self.read_file(&default_file).await?,
                    name,
                ));
            }
        }

        Err(KaiwaError::not_found("persona", name))
    }

    async fn update(&self, name: &str, instructions: &str) -> bool {
        let persona_file = self.paths.persona_file(name);

        if !persona_file.exists() {
            return false;
        }

        match fs::write(&persona_file, instructions).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(persona = name, error = %e, "failed to update persona");
                false
            }
        }
    }

    async fn create(&self, name: &str, instructions: &str) -> Result<PathBuf> {
        let persona_file = self.paths.persona_file(name);
        if persona_file.exists() {
            return Err(KaiwaError::config(format!(
                "Persona '{name}' already exists"
            )));
        }

        fs::create_dir_all(self.paths.personas_dir())
            .await
            .map_err(|e| KaiwaError::io(format!("Failed to create personas directory: {e}")))?;
        fs::write(&persona_file, instructions).await.map_err(|e| {
            KaiwaError::io(format!(
                "Failed to write '{}': {}",
                persona_file.display(),
                e
            ))
        })?;
        Ok(persona_file)
    }

    async fn delete(&self, name: &str) -> bool {
        if name.eq_ignore_ascii_case(DEFAULT_PERSONA) {
            tracing::warn!("default persona cannot be deleted");
            return false;
        }

        let persona_file = self.paths.persona_file(name);
        if !persona_file.exists() {
            return false;
        }

        match fs::remove_file(&persona_file).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(persona = name, error = %e, "failed to delete persona");
                false
            }
        }
    }

    async fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(mut entries) = fs::read_dir(self.paths.personas_dir()).await else {
            return names;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("md") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names
    }

    async fn exists(&self, name: &str) -> bool {
        self.paths.persona_file(name).exists()
    }
}
