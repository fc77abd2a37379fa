//! Slash command parsing for the terminal chat.
//!
//! Input starting with `/` controls the front end and is never forwarded to
//! the assistant.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Print the conversation so far.
    History,

    /// Drop the remote session; the next message starts a new one.
    Reset,

    /// Show the chat panel.
    Open,

    /// Hide the chat panel.
    Close,

    /// Display session statistics.
    Stats,

    /// Show the current configuration.
    ShowConfig,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a message.
///
/// # Examples
///
/// ```
/// # use kizazi::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/reset").is_some());
/// assert!(parse_command("What services do you offer?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "history" | "log" => ChatCommand::History,
        "reset" => ChatCommand::Reset,
        "open" => ChatCommand::Open,
        "close" => ChatCommand::Close,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        _ => return Some(ChatCommand::Invalid(format!("Unknown command: /{}", command))),
    };

    if let Some(argument) = argument {
        return Some(ChatCommand::Invalid(format!(
            "/{command} takes no argument (got '{argument}')"
        )));
    }
    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /history               Show the conversation so far
  /reset                 Start a fresh assistant session
  /open                  Show the chat panel
  /close                 Hide the chat panel (messages are kept)
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}
