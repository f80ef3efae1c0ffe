use kaiwa_core::repository::{ChatArchive, SaveMode, SubjectStore};
use kaiwa_core::session::{ConversationMessage, MessageRole};
use kaiwa_infrastructure::{DirChatArchive, DirSubjectStore, KaiwaPaths};
use tempfile::TempDir;

fn sample_messages() -> Vec<ConversationMessage> {
    vec![
        ConversationMessage::user("tell me about tomatoes"),
        ConversationMessage::assistant("Tomatoes like sun.\nWater them deeply."),
        ConversationMessage::user("thanks"),
    ]
}

async fn setup(temp: &TempDir, subject: &str) -> (DirChatArchive, DirSubjectStore) {
    let paths = KaiwaPaths::new(temp.path());
    let subjects = DirSubjectStore::new(paths.clone());
    subjects.create(subject).await;
    (DirChatArchive::new(paths), subjects)
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let (archive, _) = setup(&temp, "gardening").await;

    let messages = sample_messages();
    let path = archive
        .save("gardening", &messages, SaveMode::Snapshot)
        .await
        .unwrap();
    assert!(path.file_name().unwrap().to_str().unwrap().starts_with("chat_"));

    let loaded = archive.load(&path).await;
    assert_eq!(loaded, messages);
}

#[tokio::test]
async fn test_save_into_missing_subject_is_not_found() {
    let temp = TempDir::new().unwrap();
    let archive = DirChatArchive::new(KaiwaPaths::new(temp.path()));

    let err = archive
        .save("ghost", &sample_messages(), SaveMode::Snapshot)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rolling_log_appends_session_header() {
    let temp = TempDir::new().unwrap();
    let (archive, _) = setup(&temp, "gardening").await;

    let first = vec![ConversationMessage::user("one")];
    let path = archive
        .save("gardening", &first, SaveMode::RollingLog)
        .await
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "chatlog.md");

    let initial = tokio::fs::read_to_string(&path).await.unwrap();
    // First write carries no session header.
    assert!(!initial.contains("# Session"));

    let second = vec![ConversationMessage::user("two")];
    archive
        .save("gardening", &second, SaveMode::RollingLog)
        .await
        .unwrap();

    let combined = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(combined.contains("one"));
    assert!(combined.contains("\n---\n# Session "));
    assert!(combined.contains("two"));
}

#[tokio::test]
async fn test_list_all_is_empty_without_subjects_dir() {
    let temp = TempDir::new().unwrap();
    let archive = DirChatArchive::new(KaiwaPaths::new(temp.path()));
    assert!(archive.list_all().await.is_empty());
}

#[tokio::test]
async fn test_list_all_sorted_across_subjects() {
    let temp = TempDir::new().unwrap();
    let paths = KaiwaPaths::new(temp.path());
    let subjects = DirSubjectStore::new(paths.clone());
    subjects.create("alpha").await;
    subjects.create("beta").await;

    let write = |subject: &str, filename: &str| {
        let path = paths.subject_dir(subject).join(filename);
        async move { tokio::fs::write(path, "**User:**\nhi\n").await.unwrap() }
    };
    write("beta", "chat_2025-01-02-09-00.md").await;
    write("alpha", "chat_2025-01-03-09-00.md").await;
    write("alpha", "chat_2025-01-01-09-00.md").await;
    // Non-transcript files are filtered out.
    tokio::fs::write(paths.subject_dir("alpha").join("chatlog.md"), "**User:**\nx\n")
        .await
        .unwrap();
    tokio::fs::write(paths.instructions_file("alpha"), "notes")
        .await
        .unwrap();

    let all = DirChatArchive::new(paths).list_all().await;
    let filenames: Vec<&str> = all.iter().map(|e| e.filename.as_str()).collect();
    assert_eq!(
        filenames,
        vec![
            "chat_2025-01-01-09-00.md",
            "chat_2025-01-02-09-00.md",
            "chat_2025-01-03-09-00.md",
        ]
    );
    assert_eq!(all[0].subject, "alpha");
    assert_eq!(all[1].subject, "beta");
}

#[tokio::test]
async fn test_delete_chat_file() {
    let temp = TempDir::new().unwrap();
    let (archive, _) = setup(&temp, "gardening").await;

    let path = archive
        .save("gardening", &sample_messages(), SaveMode::Snapshot)
        .await
        .unwrap();
    let filename = path.file_name().unwrap().to_str().unwrap().to_string();

    assert!(archive.delete("gardening", &filename).await);
    assert!(!path.exists());
    // A second delete finds nothing.
    assert!(!archive.delete("gardening", &filename).await);
}

#[tokio::test]
async fn test_move_chat_between_subjects() {
    let temp = TempDir::new().unwrap();
    let paths = KaiwaPaths::new(temp.path());
    let (archive, _) = setup(&temp, "gardening").await;

    let path = archive
        .save("gardening", &sample_messages(), SaveMode::Snapshot)
        .await
        .unwrap();
    let filename = path.file_name().unwrap().to_str().unwrap().to_string();

    // Target subject does not exist yet; it is created.
    assert!(archive.move_to_subject("gardening", &filename, "cooking").await);
    assert!(!path.exists());

    let moved = paths.subject_dir("cooking").join(&filename);
    assert!(moved.exists());
    assert_eq!(archive.load(&moved).await, sample_messages());
}

#[tokio::test]
async fn test_move_missing_source_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let paths = KaiwaPaths::new(temp.path());
    let (archive, _) = setup(&temp, "gardening").await;

    assert!(
        !archive
            .move_to_subject("gardening", "chat_2025-01-01-09-00.md", "cooking")
            .await
    );
    assert!(!paths
        .subject_dir("cooking")
        .join("chat_2025-01-01-09-00.md")
        .exists());
}

#[tokio::test]
async fn test_load_unparseable_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let paths = KaiwaPaths::new(temp.path());
    let (archive, _) = setup(&temp, "gardening").await;

    let path = paths.subject_dir("gardening").join("chat_2025-01-01-09-00.md");
    tokio::fs::write(&path, "no role markers at all").await.unwrap();
    assert!(archive.load(&path).await.is_empty());

    // Missing file likewise loads as empty, not an error.
    let missing = paths.subject_dir("gardening").join("chat_none.md");
    assert!(archive.load(&missing).await.is_empty());
}

#[tokio::test]
async fn test_combined_history_order_and_filtering() {
    let temp = TempDir::new().unwrap();
    let paths = KaiwaPaths::new(temp.path());
    let (archive, _) = setup(&temp, "gardening").await;
    let dir = paths.subject_dir("gardening");

    tokio::fs::write(dir.join("chat_2025-01-02-09-00.md"), "**User:**\nsecond\n")
        .await
        .unwrap();
    tokio::fs::write(dir.join("chat_2025-01-01-09-00.md"), "**User:**\nfirst\n")
        .await
        .unwrap();
    // Whitespace-only transcripts are skipped.
    tokio::fs::write(dir.join("chat_2025-01-03-09-00.md"), "  \n").await.unwrap();
    tokio::fs::write(dir.join("chatlog.md"), "**User:**\nrolling\n")
        .await
        .unwrap();

    let history = archive.combined_history("gardening").await;
    let rolling = history.find("rolling").unwrap();
    let first = history.find("first").unwrap();
    let second = history.find("second").unwrap();
    assert!(rolling < first && first < second);
    assert_eq!(history.matches("\n---\n").count(), 2);
}

#[tokio::test]
async fn test_roles_survive_save_load() {
    // Roles survive the save/load cycle exactly.
    let temp = TempDir::new().unwrap();
    let (archive, _) = setup(&temp, "gardening").await;

    let messages = sample_messages();
    let path = archive
        .save("gardening", &messages, SaveMode::RollingLog)
        .await
        .unwrap();
    let loaded = archive.load(&path).await;
    assert_eq!(loaded[0].role, MessageRole::User);
    assert_eq!(loaded[1].role, MessageRole::Assistant);
}
