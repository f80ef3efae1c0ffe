//! Terminal UI: the rustyline helper, colored output, and sub-prompts.

use colored::Colorize;
use kaiwa_core::session::ConversationMessage;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};

/// The editor type used throughout the CLI.
pub type KaiwaEditor = Editor<CliHelper, DefaultHistory>;

/// Every slash command, used for completion and the /help listing.
pub const COMMANDS: &[&str] = &[
    "/help",
    "/p",
    "/s",
    "/p_new",
    "/s_new",
    "/p_inst",
    "/s_inst",
    "/p_delete",
    "/s_delete",
    "/status",
    "/clear",
    "/c_history",
    "/c_delete",
    "/c_move",
    "/save",
    "/swap",
    "/pref_streaming",
    "/exit",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone, Default)]
pub struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Prints the welcome banner.
pub fn print_welcome() {
    println!("{}", "=".repeat(60).bright_magenta());
    println!("{}", "Kaiwa - Subject-Aware Chat (Ollama)".bright_magenta().bold());
    println!("{}", "=".repeat(60).bright_magenta());
    println!("Format:");
    println!("  Persona: <name>, Subject: <name>, <prompt>");
    println!("\t- Load persona and subject, then send the prompt");
    println!("{}", "You can chat immediately without setting persona/subject.".bright_black());
    println!("{}", "• /help - List all commands".bright_black());
    println!("{}", "• /exit - Save and exit".bright_black());
    println!();
}

/// Prints the command listing for /help.
pub fn print_commands() {
    println!("{}", "=".repeat(60));
    println!("Commands:");
    println!("• /help - List all commands");
    println!("• /p - List available personas");
    println!("• /s - List available subjects");
    println!("• /p_new [name] - Create a new persona");
    println!("• /s_new [name] - Create a new subject");
    println!("• /p_inst - View/update the active persona's instructions");
    println!("• /s_inst - View/update the active subject's instructions");
    println!("• /p_delete [name] - Delete a persona");
    println!("• /s_delete [name] - Delete a subject and its chats");
    println!("• /status - Show current persona, subject, and model");
    println!("• /clear - Clear conversation history");
    println!("• /c_history - List all chats across subjects");
    println!("• /c_history_[subject] - List chats for a specific subject");
    println!("• /c_delete [index] - Delete a chat");
    println!("• /c_move - Move a chat between subjects");
    println!("• /save [rolling] - Save this session (snapshot or rolling log)");
    println!("• /swap [model] - Toggle or set the model");
    println!("• /pref_streaming - Toggle text streaming on/off");
    println!("• /exit - Save and exit");
    println!("{}", "=".repeat(60));
}

/// Prints a formatted section header.
pub fn print_section_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Prints a success message.
pub fn print_success(message: &str) {
    println!("{}", format!("✓ {message}").green());
}

/// Prints an error message.
pub fn print_error(message: &str) {
    println!("{}", format!("✗ {message}").red());
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    println!("{}", format!("⚠ {message}").yellow());
}

/// Reads one line from the user with the given prompt. `None` on Ctrl-C,
/// Ctrl-D, or read failure.
pub fn prompt_line(rl: &mut KaiwaEditor, prompt: &str) -> Option<String> {
    match rl.readline(prompt) {
        Ok(line) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

/// Asks a yes/no question; only an explicit `y` answers yes.
pub fn confirm(rl: &mut KaiwaEditor, message: &str) -> bool {
    matches!(
        prompt_line(rl, &format!("{message} (y/n): ")).as_deref(),
        Some("y") | Some("Y")
    )
}

/// Displays a loaded chat history.
pub fn display_chat_history(history: &[ConversationMessage]) {
    print_section_header("Previous Chat:");
    for msg in history {
        println!("\n{}: {}", msg.role.display_name().bold(), msg.content);
    }
    println!("\n{}", "=".repeat(60));
}
