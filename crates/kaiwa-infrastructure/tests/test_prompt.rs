use kaiwa_core::prompt::PromptBuilder;
use kaiwa_core::repository::{
    ChatArchive, PersonaStore, SubjectStore, DEFAULT_PERSONA, DEFAULT_SUBJECT,
};
use kaiwa_infrastructure::bootstrap::ensure_defaults;
use kaiwa_infrastructure::{DirChatArchive, DirPersonaStore, DirSubjectStore, KaiwaPaths};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    paths: KaiwaPaths,
    personas: Arc<DirPersonaStore>,
    subjects: Arc<DirSubjectStore>,
    builder: PromptBuilder,
}

async fn fixture(temp: &TempDir) -> Fixture {
    let paths = KaiwaPaths::new(temp.path());
    ensure_defaults(&paths).await.unwrap();

    let personas = Arc::new(DirPersonaStore::new(paths.clone()));
    let subjects = Arc::new(DirSubjectStore::new(paths.clone()));
    let archive = Arc::new(DirChatArchive::new(paths.clone()));
    let builder = PromptBuilder::new(
        personas.clone() as Arc<dyn PersonaStore>,
        subjects.clone() as Arc<dyn SubjectStore>,
        archive as Arc<dyn ChatArchive>,
    );
    Fixture {
        paths,
        personas,
        subjects,
        builder,
    }
}

#[tokio::test]
async fn test_prompt_has_persona_and_subject_blocks() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.personas.create("writer", "You are a novelist.").await.unwrap();
    f.subjects
        .save_instructions("space opera", "An epic about a generation ship.")
        .await
        .unwrap();

    let built = f
        .builder
        .build(Some("writer"), Some("space opera"))
        .await
        .unwrap();
    assert!(built.text.starts_with("# Persona\nYou are a novelist."));
    assert!(built.text.contains("# Subject Instructions\n"));
    assert!(built.text.contains("generation ship"));
    assert!(built.warnings.is_empty());
}

#[tokio::test]
async fn test_default_subject_never_includes_history() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;

    // Even with transcripts on disk for the default subject…
    let dir = f.paths.subject_dir(DEFAULT_SUBJECT);
    tokio::fs::write(dir.join("chat_2025-01-01-09-00.md"), "**User:**\nhi\n")
        .await
        .unwrap();

    // …neither an omitted subject nor the default subject pulls them in.
    let built = f.builder.build(None, None).await.unwrap();
    assert!(!built.text.contains("# Previous Chat History"));

    let built = f
        .builder
        .build(Some(DEFAULT_PERSONA), Some(DEFAULT_SUBJECT))
        .await
        .unwrap();
    assert!(!built.text.contains("# Previous Chat History"));
}

#[tokio::test]
async fn test_named_subject_includes_history() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.subjects
        .save_instructions("gardening", "Plants.")
        .await
        .unwrap();
    let dir = f.paths.subject_dir("gardening");
    tokio::fs::write(dir.join("chat_2025-01-01-09-00.md"), "**User:**\ntomatoes\n")
        .await
        .unwrap();

    let built = f.builder.build(None, Some("gardening")).await.unwrap();
    assert!(built.text.contains("# Previous Chat History"));
    assert!(built.text.contains("tomatoes"));
}

#[tokio::test]
async fn test_fallback_surfaces_warnings() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;

    let built = f
        .builder
        .build(Some("ghost"), Some("nowhere"))
        .await
        .unwrap();
    assert_eq!(built.warnings.len(), 2);
    assert!(built.warnings[0].contains("Persona 'ghost' not found"));
    assert!(built.warnings[1].contains("Subject 'nowhere' not found"));
    // The prompt is still usable, built from default content.
    assert!(built.text.contains("# Persona"));
}

#[tokio::test]
async fn test_missing_default_persona_fails() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    tokio::fs::remove_file(f.paths.persona_file(DEFAULT_PERSONA))
        .await
        .unwrap();

    let err = f.builder.build(Some("ghost"), None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_prompt_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.subjects
        .save_instructions("gardening", "Plants.")
        .await
        .unwrap();
    let dir = f.paths.subject_dir("gardening");
    tokio::fs::write(dir.join("chat_2025-01-01-09-00.md"), "**User:**\na\n")
        .await
        .unwrap();
    tokio::fs::write(dir.join("chat_2025-01-02-09-00.md"), "**User:**\nb\n")
        .await
        .unwrap();

    let first = f.builder.build(None, Some("gardening")).await.unwrap();
    let second = f.builder.build(None, Some("gardening")).await.unwrap();
    assert_eq!(first.text, second.text);
}
