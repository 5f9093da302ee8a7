//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the session
//! never depends on a particular front end.  The default implementation
//! writes to stdout with optional ANSI styling.

use std::io::{self, Stdout, Write};

use time::{OffsetDateTime, UtcOffset};
use time::macros::format_description;

use crate::types::{ConnectionStatus, Message, Role, Toast, ToastKind};

/// Display name for the tutor side of the conversation.
pub const ASSISTANT_LABEL: &str = "IntelliTutor";

/// Display name for the user side of the conversation.
pub const USER_LABEL: &str = "You";

/// ANSI escape code for dim text (used for timestamps and the typing line).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for info toasts).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for positive feedback and online).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for offline).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI sequence returning to column zero and clearing the line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one message; `position` is its 1-based place in the conversation.
    fn print_message(&mut self, position: usize, message: &Message);

    /// Show the typing indicator.
    fn start_typing(&mut self);

    /// Remove the typing indicator.
    fn finish_typing(&mut self);

    /// Print a toast notification.
    fn print_toast(&mut self, toast: &Toast);

    /// Print the connection status.
    fn print_status(&mut self, status: ConnectionStatus);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    offset: UtcOffset,
    typing: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    ///
    /// Times are shown in UTC until [`PlainTextRenderer::with_offset`] says
    /// otherwise.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            offset: UtcOffset::UTC,
            typing: false,
        }
    }

    /// Shows message times at `offset`, usually the local one.
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Flushes stdout so partial lines show up immediately.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_color {
            format!("{code}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, position: usize, message: &Message) {
        self.finish_typing();
        println!(
            "{}",
            format_message(position, message, self.offset, self.use_color)
        );
        self.flush();
    }

    fn start_typing(&mut self) {
        if self.typing {
            return;
        }
        self.typing = true;
        let line = format!("{ASSISTANT_LABEL} is typing...");
        if self.use_color {
            print!("{ANSI_DIM}{line}{ANSI_RESET}");
        } else {
            println!("{line}");
        }
        self.flush();
    }

    fn finish_typing(&mut self) {
        if !self.typing {
            return;
        }
        self.typing = false;
        if self.use_color {
            print!("{ANSI_CLEAR_LINE}");
        }
        self.flush();
    }

    fn print_toast(&mut self, toast: &Toast) {
        self.finish_typing();
        let (code, tag) = match toast.kind {
            ToastKind::Info => (ANSI_CYAN, "info"),
            ToastKind::Error => (ANSI_RED, "error"),
        };
        println!("{}", self.paint(code, &format!("[{tag}] {}", toast.text)));
    }

    fn print_status(&mut self, status: ConnectionStatus) {
        self.finish_typing();
        let code = match status {
            ConnectionStatus::Online => ANSI_GREEN,
            ConnectionStatus::Offline => ANSI_YELLOW,
            ConnectionStatus::Error => ANSI_RED,
        };
        println!("Connection: {}", self.paint(code, &status.to_string()));
    }

    fn print_error(&mut self, error: &str) {
        self.finish_typing();
        eprintln!("Error: {error}");
    }

    fn print_info(&mut self, info: &str) {
        self.finish_typing();
        println!("{info}");
    }
}

/// Formats a timestamp as `hh:mm` at the given offset.
pub fn format_time(at: OffsetDateTime, offset: UtcOffset) -> String {
    at.to_offset(offset)
        .format(format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

/// Formats one message as a header line followed by its indented content.
pub fn format_message(
    position: usize,
    message: &Message,
    offset: UtcOffset,
    use_color: bool,
) -> String {
    let label = match message.role {
        Role::User => USER_LABEL,
        Role::Assistant => ASSISTANT_LABEL,
    };
    let feedback = match message.liked {
        Some(true) => " [+]",
        Some(false) => " [-]",
        None => "",
    };
    let time = format_time(message.created_at, offset);
    let body = message
        .content
        .lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    if use_color {
        let feedback_code = if message.liked == Some(true) {
            ANSI_GREEN
        } else {
            ANSI_RED
        };
        let body_code = if message.is_error { ANSI_RED } else { "" };
        format!(
            "{ANSI_DIM}[{position}]{ANSI_RESET} {ANSI_BOLD}{label}{ANSI_RESET} \
             {ANSI_DIM}{time}{ANSI_RESET}{feedback_code}{feedback}{ANSI_RESET}\n\
             {body_code}{body}{ANSI_RESET}"
        )
    } else {
        let flag = if message.is_error { " (error)" } else { "" };
        format!("[{position}] {label} {time}{feedback}{flag}\n{body}")
    }
}
