//! Kaiwa filesystem layer.
//!
//! Directory-backed implementations of the `kaiwa-core` store and archive
//! traits, the markdown transcript codec, path conventions, first-run
//! seeding, and configuration loading.

pub mod bootstrap;
pub mod chat_archive;
pub mod config_service;
pub mod dir_persona_store;
pub mod dir_subject_store;
pub mod paths;
pub mod transcript;

pub use chat_archive::DirChatArchive;
pub use config_service::ConfigService;
pub use dir_persona_store::DirPersonaStore;
pub use dir_subject_store::DirSubjectStore;
pub use paths::KaiwaPaths;
