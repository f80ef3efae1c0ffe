//! Chat history, session, and model command handlers.
//!
//! Helpers for the commands that operate on the current chat session and
//! its stored conversations:
//!
//! - /status, /clear, /pref_streaming, /swap
//! - /c_history, /c_history_[subject], /c_delete, /c_move
//! - /save, /exit
//!
//! Plus the message path itself: sending a prompt to the model and
//! displaying the (possibly streamed) response.

use super::App;
use crate::ui::{self, KaiwaEditor};
use futures::StreamExt;
use kaiwa_core::repository::{ChatArchive, ChatEntry, SaveMode};
use kaiwa_core::session::MessageRole;
use std::io::Write;

/// Handle /status: show current persona, subject, model, and streaming.
pub fn handle_status(app: &App) {
    ui::print_section_header("Status");
    println!("Persona: {}", app.session.persona.as_deref().unwrap_or("None"));
    println!("Subject: {}", app.session.subject.as_deref().unwrap_or("None"));
    println!("Model:   {}", app.session.model);
    println!("Streaming: {}", if app.streaming { "on" } else { "off" });
}

/// Handle /clear: clear the in-memory conversation history.
pub fn handle_clear_history(app: &mut App) {
    app.session.clear_history();
    ui::print_success("Conversation history cleared.");
}

/// Handle /pref_streaming: toggle the streaming preference.
pub fn handle_streaming_toggle(app: &mut App) {
    app.streaming = !app.streaming;
    let state = if app.streaming { "enabled" } else { "disabled" };
    ui::print_success(&format!("Text streaming {state}."));
}

/// Handle /swap: toggle between the configured models, or set one explicitly.
pub fn handle_swap(app: &mut App, target: &str) {
    let new_model = if target.is_empty() {
        if app.session.model == app.config.model {
            app.config.alt_model.clone()
        } else {
            app.config.model.clone()
        }
    } else {
        target.to_string()
    };

    app.session.set_model(new_model);
    ui::print_success(&format!("Model switched to: {}", app.session.model));
}

/// Lets the user pick a chat from a numbered list. `show_subject` prefixes
/// each line with the subject name (for cross-subject listings).
fn select_chat_from_list<'a>(
    rl: &mut KaiwaEditor,
    chats: &'a [ChatEntry],
    show_subject: bool,
) -> Option<&'a ChatEntry> {
    if chats.is_empty() {
        ui::print_warning("No chats found.");
        return None;
    }

    for (idx, entry) in chats.iter().enumerate() {
        if show_subject {
            println!("{}. [{}] {}", idx + 1, entry.subject, entry.filename);
        } else {
            println!("{}. {}", idx + 1, entry.filename);
        }
    }

    let choice = ui::prompt_line(rl, "\nEnter number to open (or press Enter to cancel): ")?;
    if choice.is_empty() {
        ui::print_warning("Selection cancelled.");
        return None;
    }

    let Ok(index) = choice.parse::<usize>() else {
        ui::print_error("Invalid selection.");
        return None;
    };
    if index < 1 || index > chats.len() {
        ui::print_error("Selection out of range.");
        return None;
    }

    Some(&chats[index - 1])
}

async fn resume_selected(app: &mut App, entry: &ChatEntry) {
    match app.service.resume(&mut app.session, entry).await {
        Ok(0) => ui::print_warning("Chat file is empty or could not be parsed."),
        Ok(count) => {
            ui::print_success(&format!(
                "Loaded chat '{}' from subject '{}' ({count} messages)",
                entry.filename, entry.subject
            ));
            ui::print_success("You can now continue this conversation");
            ui::display_chat_history(&app.session.history);
        }
        Err(e) => ui::print_error(&format!("Error loading chat: {e}")),
    }
}

/// Handle /c_history: list chats across all subjects and resume one.
pub async fn handle_chat_history(app: &mut App, rl: &mut KaiwaEditor) {
    ui::print_section_header("All Chats");
    let chats = app.archive.list_all().await;
    let Some(selected) = select_chat_from_list(rl, &chats, true).cloned() else {
        return;
    };
    resume_selected(app, &selected).await;
}

/// Handle /c_history_[subject]: list chats for one subject and resume one.
pub async fn handle_chat_history_by_subject(
    app: &mut App,
    rl: &mut KaiwaEditor,
    subject_name: &str,
) {
    if subject_name.is_empty() {
        ui::print_error("Usage: /c_history_[subject]");
        return;
    }

    ui::print_section_header(&format!("Chats for subject: {subject_name}"));
    let chats = app.archive.list_by_subject(subject_name).await;
    let Some(selected) = select_chat_from_list(rl, &chats, false).cloned() else {
        return;
    };
    resume_selected(app, &selected).await;
}

/// Handle /c_delete: delete a chat by its index from the global list.
pub async fn handle_delete_chat(app: &mut App, rl: &mut KaiwaEditor, idx: &str) {
    let chats = app.archive.list_all().await;
    if chats.is_empty() {
        ui::print_warning("No chats found.");
        return;
    }

    let selected = if let Ok(index) = idx.parse::<usize>() {
        if index < 1 || index > chats.len() {
            ui::print_error("Index out of range.");
            return;
        }
        chats[index - 1].clone()
    } else {
        ui::print_section_header("Delete Chat");
        match select_chat_from_list(rl, &chats, true).cloned() {
            Some(entry) => entry,
            None => return,
        }
    };

    if !ui::confirm(
        rl,
        &format!(
            "Are you sure you want to delete '{}' from subject '{}'?",
            selected.filename, selected.subject
        ),
    ) {
        ui::print_warning("Delete chat cancelled.");
        return;
    }

    if app.archive.delete(&selected.subject, &selected.filename).await {
        ui::print_success(&format!("Deleted chat '{}'.", selected.filename));
    } else {
        ui::print_error(&format!("Failed to delete chat '{}'.", selected.filename));
    }
}

/// Handle /c_move: move a chat file from one subject to another.
pub async fn handle_chat_move(app: &mut App, rl: &mut KaiwaEditor) {
    let chats = app.archive.list_all().await;
    if chats.is_empty() {
        ui::print_warning("No chats found.");
        return;
    }

    ui::print_section_header("Move Chat");
    let Some(selected) = select_chat_from_list(rl, &chats, true).cloned() else {
        return;
    };

    let Some(target_subject) = ui::prompt_line(rl, "Enter target subject name: ") else {
        return;
    };
    if target_subject.is_empty() {
        ui::print_error("Target subject name cannot be empty.");
        return;
    }

    if !ui::confirm(
        rl,
        &format!(
            "Move '{}' from '{}' to '{}'?",
            selected.filename, selected.subject, target_subject
        ),
    ) {
        ui::print_warning("Move chat cancelled.");
        return;
    }

    if app
        .archive
        .move_to_subject(&selected.subject, &selected.filename, &target_subject)
        .await
    {
        ui::print_success(&format!(
            "Moved '{}' to subject '{}'.",
            selected.filename, target_subject
        ));
    } else {
        ui::print_error(&format!("Failed to move chat '{}'.", selected.filename));
    }
}

/// Handle /save: persist the in-memory session.
pub async fn handle_save(app: &mut App, rolling: bool) {
    if app.session.history.is_empty() {
        ui::print_warning("Nothing to save: conversation history is empty.");
        return;
    }

    let mode = if rolling {
        SaveMode::RollingLog
    } else {
        SaveMode::Snapshot
    };

    match app.service.persist(&mut app.session, mode).await {
        Ok(outcome) => {
            ui::print_success(&format!("Chat saved to {}", outcome.path.display()));
            if let Some(removed) = outcome.removed_previous {
                ui::print_success(&format!("Removed old chat file: {removed}"));
            }
        }
        Err(e) => ui::print_error(&format!("Failed to save chat: {e}")),
    }
}

/// Handle /exit: offer to save the session, then signal the loop to quit.
pub async fn handle_exit(app: &mut App, rl: &mut KaiwaEditor) {
    if !app.session.history.is_empty() {
        let subject = app.session.subject_or_default().to_string();
        if ui::confirm(rl, &format!("Save chat to '{subject}'?")) {
            handle_save(app, false).await;
        }
    }
    ui::print_success("Exiting chat. Goodbye!");
}

/// Sends a prompt to the model and displays the response.
///
/// The user message joins the history first; the assistant response is
/// appended only once it is fully received. A failed call prints an error
/// line in place of the response and leaves no assistant message behind.
pub async fn process_message(app: &mut App, prompt: &str) {
    app.session.add_message(MessageRole::User, prompt);

    let system_prompt = if app.session.system_prompt.is_empty() {
        None
    } else {
        Some(app.session.system_prompt.clone())
    };

    println!();
    if app.streaming {
        let stream = app
            .agent
            .chat_stream(
                &app.session.model,
                system_prompt.as_deref(),
                &app.session.history,
            )
            .await;

        match stream {
            Ok(mut tokens) => {
                let mut response = String::new();
                let mut failed = false;
                while let Some(item) = tokens.next().await {
                    match item {
                        Ok(token) => {
                            print!("{token}");
                            let _ = std::io::stdout().flush();
                            response.push_str(&token);
                        }
                        Err(e) => {
                            println!();
                            ui::print_error(&format!("Error communicating with model: {e}"));
                            failed = true;
                            break;
                        }
                    }
                }
                if !failed && !response.is_empty() {
                    println!();
                    app.session.add_message(MessageRole::Assistant, response);
                }
            }
            Err(e) => ui::print_error(&format!("Error communicating with model: {e}")),
        }
    } else {
        match app
            .agent
            .chat(
                &app.session.model,
                system_prompt.as_deref(),
                &app.session.history,
            )
            .await
        {
            Ok(response) => {
                println!("{response}");
                app.session.add_message(MessageRole::Assistant, response);
            }
            Err(e) => ui::print_error(&format!("Error communicating with model: {e}")),
        }
    }
}
