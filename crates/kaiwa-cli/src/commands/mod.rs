//! Central command routing.
//!
//! Inspects each input line and routes slash commands to their handlers,
//! inline persona/subject directives to the switch path, and everything
//! else to the model as a prompt.

pub mod chat_commands;
pub mod subject_commands;

use crate::ui::KaiwaEditor;
use kaiwa_core::config::RootConfig;
use kaiwa_core::repository::{ChatArchive, PersonaStore, SubjectStore};
use kaiwa_core::session::{ChatSession, SessionService};
use kaiwa_interaction::OllamaAgent;
use std::sync::Arc;

/// Everything the command handlers operate on.
///
/// The session is the only mutable state; it is owned here and passed by
/// reference into each operation.
pub struct App {
    pub session: ChatSession,
    pub service: SessionService,
    pub personas: Arc<dyn PersonaStore>,
    pub subjects: Arc<dyn SubjectStore>,
    pub archive: Arc<dyn ChatArchive>,
    pub agent: OllamaAgent,
    pub config: RootConfig,
    pub streaming: bool,
}

/// What the router decided about one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Stop the main loop.
    Exit,
    /// The line was consumed by a command handler.
    Handled,
    /// Forward this text to the model as a prompt.
    Prompt(String),
}

fn arg_after(input: &str) -> &str {
    input
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("")
}

/// Processes a single input line.
pub async fn handle_command(
    app: &mut App,
    rl: &mut KaiwaEditor,
    input: &str,
) -> CommandOutcome {
    let cmd = input.to_lowercase();

    match cmd.as_str() {
        "/exit" => {
            chat_commands::handle_exit(app, rl).await;
            return CommandOutcome::Exit;
        }
        "/help" => {
            crate::ui::print_commands();
            return CommandOutcome::Handled;
        }
        "/pref_streaming" => {
            chat_commands::handle_streaming_toggle(app);
            return CommandOutcome::Handled;
        }
        "/p" => {
            subject_commands::handle_list_personas(app).await;
            return CommandOutcome::Handled;
        }
        "/s" => {
            subject_commands::handle_list_subjects(app).await;
            return CommandOutcome::Handled;
        }
        "/p_inst" => {
            subject_commands::handle_view_persona(app, rl).await;
            return CommandOutcome::Handled;
        }
        "/s_inst" => {
            subject_commands::handle_view_subject(app, rl).await;
            return CommandOutcome::Handled;
        }
        "/status" => {
            chat_commands::handle_status(app);
            return CommandOutcome::Handled;
        }
        "/clear" => {
            chat_commands::handle_clear_history(app);
            return CommandOutcome::Handled;
        }
        "/c_history" => {
            chat_commands::handle_chat_history(app, rl).await;
            return CommandOutcome::Handled;
        }
        "/c_move" => {
            chat_commands::handle_chat_move(app, rl).await;
            return CommandOutcome::Handled;
        }
        _ => {}
    }

    if cmd.starts_with("/c_history_") {
        // Take the subject name from the raw input to preserve its case.
        let subject = input["/c_history_".len()..].trim();
        chat_commands::handle_chat_history_by_subject(app, rl, subject).await;
        return CommandOutcome::Handled;
    }

    if cmd.starts_with("/s_new") {
        subject_commands::handle_new_subject(app, rl, arg_after(input)).await;
        return CommandOutcome::Handled;
    }
    if cmd.starts_with("/p_new") {
        subject_commands::handle_new_persona(app, rl, arg_after(input)).await;
        return CommandOutcome::Handled;
    }
    if cmd.starts_with("/p_delete") {
        subject_commands::handle_delete_persona(app, rl, arg_after(input)).await;
        return CommandOutcome::Handled;
    }
    if cmd.starts_with("/s_delete") {
        subject_commands::handle_delete_subject(app, rl, arg_after(input)).await;
        return CommandOutcome::Handled;
    }
    if cmd.starts_with("/c_delete") {
        chat_commands::handle_delete_chat(app, rl, arg_after(input)).await;
        return CommandOutcome::Handled;
    }
    if cmd.starts_with("/save") {
        let rolling = arg_after(input).eq_ignore_ascii_case("rolling");
        chat_commands::handle_save(app, rolling).await;
        return CommandOutcome::Handled;
    }
    if cmd.starts_with("/swap") {
        chat_commands::handle_swap(app, arg_after(input));
        return CommandOutcome::Handled;
    }

    // Not a recognized command - check for an inline persona/subject switch,
    // otherwise treat as a normal prompt.
    match subject_commands::handle_inline_switch(app, input).await {
        subject_commands::SwitchOutcome::NoDirective => {
            CommandOutcome::Prompt(input.to_string())
        }
        subject_commands::SwitchOutcome::MetaOnly => CommandOutcome::Handled,
        subject_commands::SwitchOutcome::Forward(prompt) => CommandOutcome::Prompt(prompt),
    }
}
