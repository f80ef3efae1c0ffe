//! Subject and persona management command handlers.
//!
//! These implement the interactive flows for listing, viewing, creating,
//! deleting, and switching personas and subjects.

use super::App;
use crate::ui::{self, KaiwaEditor};
use kaiwa_core::directive::parse_directive;
use kaiwa_core::repository::{PersonaStore, SubjectStore, DEFAULT_PERSONA, DEFAULT_SUBJECT};

/// Outcome of scanning a line for an inline persona/subject switch.
pub enum SwitchOutcome {
    /// No directive found: the line is a plain prompt.
    NoDirective,
    /// A pure switch line with no prompt to forward.
    MetaOnly,
    /// A switch followed by prompt text to forward to the model.
    Forward(String),
}

/// Handle /p: list all available personas.
pub async fn handle_list_personas(app: &App) {
    let personas = app.personas.list().await;
    println!("Available personas: {}", personas.join(", "));
}

/// Handle /s: list all available subjects.
pub async fn handle_list_subjects(app: &App) {
    let subjects = app.subjects.list().await;
    println!("Available subjects: {}", subjects.join(", "));
}

/// Handle /s_inst: view and optionally update subject instructions.
pub async fn handle_view_subject(app: &mut App, rl: &mut KaiwaEditor) {
    let current_subject = app.session.subject_or_default().to_string();

    println!("\n=== Subject: {current_subject} ===\n");

    match app
        .subjects
        .load_instructions(Some(current_subject.as_str()))
        .await
    {
        Ok(instructions) => {
            println!("Current Instructions:");
            println!("{}", "-".repeat(50));
            println!("{}", instructions.content);
            println!("{}", "-".repeat(50));

            if !ui::confirm(rl, "\nDo you want to update these instructions?") {
                return;
            }

            println!("\nEnter new instructions (press Enter when done):\n");
            let Some(new_instructions) = ui::prompt_line(rl, "> ") else {
                return;
            };
            if new_instructions.is_empty() {
                ui::print_warning("No instructions provided. Update cancelled.");
                return;
            }

            if app
                .subjects
                .update_instructions(&current_subject, &new_instructions)
                .await
            {
                ui::print_success("Subject instructions updated successfully.");
                match app.service.rebuild_prompt(&mut app.session).await {
                    Ok(()) => ui::print_success("System prompt updated with new instructions."),
                    Err(e) => ui::print_error(&format!("Error rebuilding system prompt: {e}")),
                }
            } else {
                ui::print_error("Failed to update subject instructions.");
            }
        }
        Err(e) => ui::print_error(&format!("Error: {e}")),
    }
}

/// Handle /p_inst: view and optionally update persona instructions.
///
/// The default persona is view-only.
pub async fn handle_view_persona(app: &mut App, rl: &mut KaiwaEditor) {
    let current_persona = app.session.persona_or_default().to_string();
    let is_default = current_persona.eq_ignore_ascii_case(DEFAULT_PERSONA);

    println!("\n=== Persona: {current_persona} ===\n");

    match app.personas.load(Some(current_persona.as_str())).await {
        Ok(instructions) => {
            println!("Current Instructions:");
            println!("{}", "-".repeat(50));
            println!("{}", instructions.content);
            println!("{}", "-".repeat(50));

            if is_default {
                ui::print_warning("Default persona cannot be updated.");
                return;
            }

            if !ui::confirm(rl, "\nDo you want to update these instructions?") {
                return;
            }

            println!("\nEnter new instructions (press Enter when done):\n");
            let Some(new_instructions) = ui::prompt_line(rl, "> ") else {
                return;
            };
            if new_instructions.is_empty() {
                ui::print_warning("No instructions provided. Update cancelled.");
                return;
            }

            if app.personas.update(&current_persona, &new_instructions).await {
                ui::print_success("Persona instructions updated successfully.");
                match app.service.rebuild_prompt(&mut app.session).await {
                    Ok(()) => ui::print_success("System prompt updated with new instructions."),
                    Err(e) => ui::print_error(&format!("Error rebuilding system prompt: {e}")),
                }
            } else {
                ui::print_error("Failed to update persona instructions.");
            }
        }
        Err(e) => ui::print_error(&format!("Error: {e}")),
    }
}

/// Handle /s_new: create a new subject and optional instructions.
pub async fn handle_new_subject(app: &mut App, rl: &mut KaiwaEditor, subject_name: &str) {
    if subject_name.is_empty() {
        ui::print_error("Usage: /s_new [subject_name]");
        return;
    }

    if !app.subjects.create(subject_name).await {
        ui::print_error(&format!("Subject '{subject_name}' already exists."));
        return;
    }
    ui::print_success(&format!("'{subject_name}' created."));

    if ui::confirm(rl, "Do you want to add subject instructions?") {
        println!("\nThe next prompt will be saved as instructions for this subject.");
        println!("Enter your instructions (press Enter when done):\n");

        match ui::prompt_line(rl, "> ") {
            Some(instructions) if !instructions.is_empty() => {
                match app
                    .subjects
                    .save_instructions(subject_name, &instructions)
                    .await
                {
                    Ok(_) => ui::print_success("Instructions saved."),
                    Err(e) => ui::print_error(&format!("Error saving instructions: {e}")),
                }
            }
            _ => ui::print_warning("No instructions provided."),
        }
    }
    println!("\nWhat is your first prompt for '{subject_name}'?");

    // New subjects start under the default persona.
    match app
        .service
        .activate(
            &mut app.session,
            Some(DEFAULT_PERSONA.to_string()),
            Some(subject_name.to_string()),
        )
        .await
    {
        Ok(_) => ui::print_success(&format!("Loaded Subject: {subject_name}")),
        Err(e) => ui::print_error(&format!("Error loading subject: {e}")),
    }
}

/// Handle /p_new: create a new persona and its instructions.
pub async fn handle_new_persona(app: &mut App, rl: &mut KaiwaEditor, persona_name: &str) {
    if persona_name.is_empty() {
        ui::print_error("Usage: /p_new [persona_name]");
        return;
    }

    let stripped: String = persona_name
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect();
    if stripped.is_empty() || !stripped.chars().all(char::is_alphanumeric) {
        ui::print_error("Persona name must be alphanumeric (underscores and hyphens allowed)");
        return;
    }

    if app.personas.exists(persona_name).await {
        ui::print_error(&format!("Persona '{persona_name}' already exists"));
        return;
    }

    println!("{persona_name} created.");
    println!("The next prompt will be saved as instructions for this persona.");

    let Some(description) = ui::prompt_line(rl, "\n> ") else {
        return;
    };
    if description.is_empty() {
        ui::print_error("Persona description cannot be empty");
        return;
    }

    if let Err(e) = app.personas.create(persona_name, &description).await {
        ui::print_error(&format!("Error creating persona: {e}"));
        return;
    }
    println!("\nPersona description saved.");

    let current_subject = app.session.subject_or_default().to_string();
    match app
        .service
        .activate(
            &mut app.session,
            Some(persona_name.to_string()),
            Some(current_subject),
        )
        .await
    {
        Ok(_) => {
            ui::print_success(&format!("Loaded Persona: {persona_name}"));
            println!("What is your first prompt for {persona_name}?");
        }
        Err(e) => ui::print_error(&format!("Error loading persona: {e}")),
    }
}

/// Handle /p_delete: delete an existing persona and reset if needed.
pub async fn handle_delete_persona(app: &mut App, rl: &mut KaiwaEditor, persona_name: &str) {
    if persona_name.is_empty() {
        ui::print_error("Usage: /p_delete [persona_name]");
        return;
    }

    if persona_name.eq_ignore_ascii_case(DEFAULT_PERSONA) {
        ui::print_error("Default persona cannot be deleted.");
        return;
    }

    let current_persona = app.session.persona_or_default().to_string();
    let deleting_active = persona_name.eq_ignore_ascii_case(&current_persona);
    if deleting_active {
        ui::print_warning("You are deleting the currently loaded persona.");
    }

    if !ui::confirm(
        rl,
        &format!("Are you sure you want to delete persona '{persona_name}'?"),
    ) {
        ui::print_warning("Delete persona cancelled.");
        return;
    }

    if app.personas.delete(persona_name).await {
        ui::print_success(&format!("Persona '{persona_name}' deleted."));
        if deleting_active {
            let subject = app.session.subject_or_default().to_string();
            match app
                .service
                .activate(
                    &mut app.session,
                    Some(DEFAULT_PERSONA.to_string()),
                    Some(subject),
                )
                .await
            {
                Ok(_) => ui::print_success("Reverted to default persona."),
                Err(e) => ui::print_error(&format!("Error reverting persona: {e}")),
            }
        }
    } else {
        ui::print_error(&format!("Failed to delete persona '{persona_name}'."));
    }
}

/// Handle /s_delete: delete a subject folder and its chats.
pub async fn handle_delete_subject(app: &mut App, rl: &mut KaiwaEditor, subject_name: &str) {
    if subject_name.is_empty() {
        ui::print_error("Usage: /s_delete [subject_name]");
        return;
    }

    if subject_name == DEFAULT_SUBJECT {
        ui::print_error("Default subject cannot be deleted.");
        return;
    }

    let current_subject = app.session.subject_or_default().to_string();
    let deleting_active = subject_name == current_subject;
    if deleting_active {
        ui::print_warning("You are deleting the currently loaded subject and its chats.");
    }

    if !ui::confirm(
        rl,
        &format!("Are you sure you want to delete subject '{subject_name}' and all its chats?"),
    ) {
        ui::print_warning("Delete subject cancelled.");
        return;
    }

    if app.subjects.delete(subject_name).await {
        ui::print_success(&format!("Subject '{subject_name}' deleted."));
        if deleting_active {
            let persona = app.session.persona_or_default().to_string();
            match app
                .service
                .activate(
                    &mut app.session,
                    Some(persona),
                    Some(DEFAULT_SUBJECT.to_string()),
                )
                .await
            {
                Ok(_) => ui::print_success("Reverted to default subject."),
                Err(e) => ui::print_error(&format!("Error reverting subject: {e}")),
            }
        }
    } else {
        ui::print_error(&format!("Failed to delete subject '{subject_name}'."));
    }
}

/// Handles inline persona/subject switching in free-form user input.
///
/// A requested persona or subject that does not exist falls back to the
/// default, with a hint pointing at the matching create command.
pub async fn handle_inline_switch(app: &mut App, input: &str) -> SwitchOutcome {
    let directive = parse_directive(input);
    if !directive.has_directive() {
        return SwitchOutcome::NoDirective;
    }

    let report = match app
        .service
        .activate(&mut app.session, directive.persona, directive.subject)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            ui::print_error(&format!("Error: {e}"));
            return SwitchOutcome::MetaOnly;
        }
    };

    if let Some(missing) = &report.missing_persona {
        ui::print_warning(&format!("Persona '{missing}' not found, using default"));
        println!("\t- You can use '/p_new {missing}' to create a new persona");
    }
    if let Some(missing) = &report.missing_subject {
        ui::print_warning(&format!("Subject '{missing}' not found, using default"));
        println!("\t- You can use '/s_new {missing}' to create a new subject");
    }

    ui::print_success(&format!("Loaded Persona: {}", report.persona));
    ui::print_success(&format!("Loaded Subject: {}", report.subject));

    if directive.prompt.is_empty() {
        SwitchOutcome::MetaOnly
    } else {
        SwitchOutcome::Forward(directive.prompt)
    }
}
