//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the tutor.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the tutor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Mark a message helpful.
    /// `None` targets the most recent tutor message.
    Like(Option<usize>),

    /// Mark a message unhelpful.
    /// `None` targets the most recent tutor message.
    Dislike(Option<usize>),

    /// Copy a message to the clipboard.
    /// `None` targets the most recent tutor message.
    Copy(Option<usize>),

    /// List quick replies, or send the numbered one.
    Quick(Option<usize>),

    /// Probe the tutor service.
    Health,

    /// Show the connection status.
    Status,

    /// Print the whole conversation again.
    History,

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use intellitutor::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/like 3").is_some());
/// assert!(parse_command("What is a derivative?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "like" | "up" => parse_position(argument, ChatCommand::Like, "/like"),
        "dislike" | "down" => parse_position(argument, ChatCommand::Dislike, "/dislike"),
        "copy" | "cp" => parse_position(argument, ChatCommand::Copy, "/copy"),
        "quick" => parse_position(argument, ChatCommand::Quick, "/quick"),
        "health" | "ping" => ChatCommand::Health,
        "status" => ChatCommand::Status,
        "history" => ChatCommand::History,
        "stats" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_position<F>(argument: Option<&str>, constructor: F, name: &str) -> ChatCommand
where
    F: Fn(Option<usize>) -> ChatCommand,
{
    match argument {
        None => constructor(None),
        Some(arg) => match arg.parse::<usize>() {
            Ok(value) if value > 0 => constructor(Some(value)),
            _ => ChatCommand::Invalid(format!("{} expects a positive message number", name)),
        },
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /like [n]              Mark message n (default: latest reply) as helpful
  /dislike [n]           Mark message n (default: latest reply) as unhelpful
  /copy [n]              Copy message n (default: latest reply) to the clipboard
  /quick [n]             List quick replies, or send quick reply n
  /health                Probe the tutor service
  /status                Show the connection status
  /history               Show the whole conversation
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
