//! Kaiwa terminal entry point.
//!
//! Wires the filesystem stores, the session service, and the Ollama agent
//! together, then runs a rustyline REPL that routes each line through the
//! command router.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use kaiwa_core::repository::{ChatArchive, PersonaStore, SubjectStore};
use kaiwa_core::session::{ChatSession, SessionService};
use kaiwa_infrastructure::bootstrap::ensure_defaults;
use kaiwa_infrastructure::{
    ConfigService, DirChatArchive, DirPersonaStore, DirSubjectStore, KaiwaPaths,
};
use kaiwa_interaction::OllamaAgent;

mod commands;
mod ui;

use commands::{App, CommandOutcome};
use ui::{CliHelper, KaiwaEditor};

#[derive(Parser)]
#[command(name = "kaiwa")]
#[command(about = "Kaiwa - subject-aware terminal chat for local LLMs", long_about = None)]
struct Cli {
    /// Data directory holding personas/ and subjects/ (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Model to chat with (overrides config)
    #[arg(long, short)]
    model: Option<String>,

    /// Base URL of the Ollama endpoint (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// Disable token streaming for this session
    #[arg(long)]
    no_stream: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigService::new().get_config();

    // ===== Backend Initialization =====
    let data_dir = cli.data_dir.or_else(|| config.data_dir.clone());
    let paths = KaiwaPaths::resolve(data_dir.as_deref())?;
    ensure_defaults(&paths).await?;

    let personas: Arc<dyn PersonaStore> = Arc::new(DirPersonaStore::new(paths.clone()));
    let subjects: Arc<dyn SubjectStore> = Arc::new(DirSubjectStore::new(paths.clone()));
    let archive: Arc<dyn ChatArchive> = Arc::new(DirChatArchive::new(paths.clone()));
    let service = SessionService::new(
        Arc::clone(&personas),
        Arc::clone(&subjects),
        Arc::clone(&archive),
    );

    let endpoint = cli.endpoint.unwrap_or_else(|| config.endpoint.clone());
    let agent = OllamaAgent::new(endpoint);
    let model = cli.model.unwrap_or_else(|| config.model.clone());
    let streaming = if cli.no_stream { false } else { config.streaming };

    let mut app = App {
        session: ChatSession::new(model),
        service,
        personas,
        subjects,
        archive,
        agent,
        config,
        streaming,
    };

    // Load the default persona/subject scope immediately so the session can
    // chat without any setup.
    if let Err(e) = app.service.activate(&mut app.session, None, None).await {
        ui::print_warning(&format!("Could not load defaults: {e}"));
    }

    // ===== REPL Setup =====
    let mut rl: KaiwaEditor = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    ui::print_welcome();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline("\n> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match commands::handle_command(&mut app, &mut rl, trimmed).await {
                    CommandOutcome::Exit => break,
                    CommandOutcome::Handled => {}
                    CommandOutcome::Prompt(prompt) => {
                        commands::chat_commands::process_message(&mut app, &prompt).await;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                ui::print_warning("Use /exit to save and quit.");
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                commands::chat_commands::handle_exit(&mut app, &mut rl).await;
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}
