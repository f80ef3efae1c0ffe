//! Unified path management for kaiwa data and configuration files.
//!
//! All persona, subject, and transcript files live under one data root;
//! configuration lives in the platform config directory.
//!
//! # Directory Structure
//!
//! ```text
//! <data root>/                      # ~/.local/share/kaiwa/ by default
//! ├── personas/
//! │   ├── default.md
//! │   └── <name>.md                 # persona names are lowercased on disk
//! └── subjects/
//!     └── <name>/
//!         ├── instructions
//!         ├── chatlog.md            # rolling log
//!         └── chat_<timestamp>.md   # timestamped snapshots
//!
//! ~/.config/kaiwa/
//! └── config.toml
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for kaiwa.
///
/// A `KaiwaPaths` is rooted at one data directory; every store and the chat
/// archive derive their locations from it so tests can point the whole stack
/// at a temporary directory.
#[derive(Debug, Clone)]
pub struct KaiwaPaths {
    base: PathBuf,
}

impl KaiwaPaths {
    /// Creates paths rooted at the given base directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolves the data root: an explicit override when given, otherwise
    /// the platform data directory (e.g. `~/.local/share/kaiwa/`).
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, PathError> {
        match override_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => dirs::data_dir()
                .map(|d| Self::new(d.join("kaiwa")))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// The data root directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding persona instruction files.
    pub fn personas_dir(&self) -> PathBuf {
        self.base.join("personas")
    }

    /// File backing one persona. Persona names are case-insensitive, so the
    /// on-disk filename is lowercased.
    pub fn persona_file(&self, name: &str) -> PathBuf {
        self.personas_dir().join(format!("{}.md", name.to_lowercase()))
    }

    /// Directory holding all subject directories.
    pub fn subjects_dir(&self) -> PathBuf {
        self.base.join("subjects")
    }

    /// Directory backing one subject.
    pub fn subject_dir(&self, name: &str) -> PathBuf {
        self.subjects_dir().join(name)
    }

    /// A subject's instructions file.
    pub fn instructions_file(&self, name: &str) -> PathBuf {
        self.subject_dir(name).join("instructions")
    }

    /// Returns the kaiwa configuration directory (e.g. `~/.config/kaiwa/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|d| d.join("kaiwa"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
