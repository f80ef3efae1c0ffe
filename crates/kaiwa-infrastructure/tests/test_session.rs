use kaiwa_core::repository::{
    ChatArchive, PersonaStore, SaveMode, SubjectStore, DEFAULT_PERSONA, DEFAULT_SUBJECT,
};
use kaiwa_core::session::{ChatSession, MessageRole, SessionService};
use kaiwa_infrastructure::bootstrap::ensure_defaults;
use kaiwa_infrastructure::{DirChatArchive, DirPersonaStore, DirSubjectStore, KaiwaPaths};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    paths: KaiwaPaths,
    archive: Arc<DirChatArchive>,
    subjects: Arc<DirSubjectStore>,
    personas: Arc<DirPersonaStore>,
    service: SessionService,
}

async fn fixture(temp: &TempDir) -> Fixture {
    let paths = KaiwaPaths::new(temp.path());
    ensure_defaults(&paths).await.unwrap();

    let personas = Arc::new(DirPersonaStore::new(paths.clone()));
    let subjects = Arc::new(DirSubjectStore::new(paths.clone()));
    let archive = Arc::new(DirChatArchive::new(paths.clone()));
    let service = SessionService::new(
        personas.clone() as Arc<dyn PersonaStore>,
        subjects.clone() as Arc<dyn SubjectStore>,
        archive.clone() as Arc<dyn ChatArchive>,
    );
    Fixture {
        paths,
        archive,
        subjects,
        personas,
        service,
    }
}

#[tokio::test]
async fn test_activate_switches_scope_and_clears_history() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.personas.create("writer", "You are a novelist.").await.unwrap();
    f.subjects.save_instructions("space opera", "Epic.").await.unwrap();

    let mut session = ChatSession::new("llama3");
    session.add_message(MessageRole::User, "stale");

    let report = f
        .service
        .activate(
            &mut session,
            Some("writer".to_string()),
            Some("space opera".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(report.persona, "writer");
    assert_eq!(report.subject, "space opera");
    assert!(report.missing_persona.is_none());
    assert!(session.history.is_empty());
    assert!(session.system_prompt.contains("You are a novelist."));
}

#[tokio::test]
async fn test_activate_missing_names_fall_back() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;

    let mut session = ChatSession::new("llama3");
    let report = f
        .service
        .activate(
            &mut session,
            Some("ghost".to_string()),
            Some("nowhere".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(report.persona, DEFAULT_PERSONA);
    assert_eq!(report.subject, DEFAULT_SUBJECT);
    assert_eq!(report.missing_persona.as_deref(), Some("ghost"));
    assert_eq!(report.missing_subject.as_deref(), Some("nowhere"));
    assert_eq!(session.persona_or_default(), DEFAULT_PERSONA);
}

#[tokio::test]
async fn test_resume_loads_history_and_scope() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.subjects.save_instructions("gardening", "Plants.").await.unwrap();

    let mut seeded = ChatSession::new("llama3");
    seeded.add_message(MessageRole::User, "tomatoes?");
    seeded.add_message(MessageRole::Assistant, "they like sun");
    f.archive
        .save("gardening", &seeded.history, SaveMode::Snapshot)
        .await
        .unwrap();

    let entry = f.archive.list_by_subject("gardening").await.remove(0);
    let mut session = ChatSession::new("llama3");
    let count = f.service.resume(&mut session, &entry).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(session.subject_or_default(), "gardening");
    assert_eq!(session.persona_or_default(), DEFAULT_PERSONA);
    assert_eq!(session.resumed_from.as_ref().unwrap().filename, entry.filename);
}

#[tokio::test]
async fn test_resume_empty_file_leaves_session_untouched() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.subjects.save_instructions("gardening", "Plants.").await.unwrap();
    let path = f.paths.subject_dir("gardening").join("chat_2025-01-01-09-00.md");
    tokio::fs::write(&path, "not a transcript").await.unwrap();

    let entry = f.archive.list_by_subject("gardening").await.remove(0);
    let mut session = ChatSession::new("llama3");
    let count = f.service.resume(&mut session, &entry).await.unwrap();

    assert_eq!(count, 0);
    assert!(session.history.is_empty());
    assert!(session.resumed_from.is_none());
}

#[tokio::test]
async fn test_persist_after_resume_removes_old_file() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.subjects.save_instructions("gardening", "Plants.").await.unwrap();

    // Seed a resumable snapshot with a timestamp that cannot collide with
    // the one persist() generates now.
    let old_path = f.paths.subject_dir("gardening").join("chat_2000-01-01-00-00.md");
    tokio::fs::write(&old_path, "**User:**\nold\n").await.unwrap();

    let entry = f.archive.list_by_subject("gardening").await.remove(0);
    let mut session = ChatSession::new("llama3");
    f.service.resume(&mut session, &entry).await.unwrap();
    session.add_message(MessageRole::Assistant, "new turn");

    let outcome = f.service.persist(&mut session, SaveMode::Snapshot).await.unwrap();
    assert!(outcome.path.exists());
    assert_eq!(outcome.removed_previous.as_deref(), Some("chat_2000-01-01-00-00.md"));
    assert!(!old_path.exists());
    assert!(session.resumed_from.is_none());

    // Exactly one transcript remains: the resaved one.
    let remaining = f.archive.list_by_subject("gardening").await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].path, outcome.path);
}

#[tokio::test]
async fn test_persist_without_resume_removes_nothing() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.subjects.save_instructions("gardening", "Plants.").await.unwrap();

    let mut session = ChatSession::new("llama3");
    session.set_scope(DEFAULT_PERSONA, "gardening");
    session.add_message(MessageRole::User, "hello");

    let outcome = f.service.persist(&mut session, SaveMode::Snapshot).await.unwrap();
    assert!(outcome.removed_previous.is_none());
    assert!(outcome.path.exists());
}

#[tokio::test]
async fn test_rolling_resave_does_not_delete_itself() {
    let temp = TempDir::new().unwrap();
    let f = fixture(&temp).await;
    f.subjects.save_instructions("gardening", "Plants.").await.unwrap();

    // Simulate a session resumed from the rolling log.
    let log_path = f.paths.subject_dir("gardening").join("chatlog.md");
    tokio::fs::write(&log_path, "**User:**\nearlier\n").await.unwrap();

    let mut session = ChatSession::new("llama3");
    session.set_scope(DEFAULT_PERSONA, "gardening");
    session.load_history(f.archive.load(&log_path).await);
    session.resumed_from = Some(kaiwa_core::session::ResumedFrom {
        subject: "gardening".to_string(),
        filename: "chatlog.md".to_string(),
    });
    session.add_message(MessageRole::Assistant, "later");

    let outcome = f
        .service
        .persist(&mut session, SaveMode::RollingLog)
        .await
        .unwrap();
    assert_eq!(outcome.path, log_path);
    assert!(outcome.removed_previous.is_none());
    assert!(log_path.exists());
}
