//! Output rendering for the terminal chat.
//!
//! The [`Renderer`] trait decouples the chat loop from how messages reach the
//! screen.  [`PlainTextRenderer`] writes to stdout with optional ANSI styling.

use std::io::{self, Write};

use crate::chat::{ChatMessage, ChatRole, ChatWidget};

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for status lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the visitor label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Label printed before assistant messages.
const ASSISTANT_LABEL: &str = "Kizazi AI";

/// Label printed before visitor messages.
const USER_LABEL: &str = "You";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one conversation message.
    fn print_message(&mut self, message: &ChatMessage);

    /// Print the widget's status line.
    fn print_status(&mut self, widget: &ChatWidget);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            out: Box::new(io::stdout()),
            use_color,
        }
    }

    /// Renders into `out` instead of stdout.
    pub fn with_writer(out: Box<dyn Write + Send>, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Returns true if ANSI styling is enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Formats a message the way [`Renderer::print_message`] prints it.
    pub fn format_message(&self, message: &ChatMessage) -> String {
        let (label, color) = match message.role() {
            ChatRole::User => (USER_LABEL, ANSI_GREEN),
            ChatRole::Assistant => (ASSISTANT_LABEL, ANSI_CYAN),
        };
        if self.use_color {
            format!("{ANSI_BOLD}{color}{label}>{ANSI_RESET} {}", message.text())
        } else {
            format!("{label}> {}", message.text())
        }
    }

    fn write_line(&mut self, line: &str) {
        // Write errors on a closed stdout are ignored.
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &ChatMessage) {
        let line = self.format_message(message);
        self.write_line(&line);
    }

    fn print_status(&mut self, widget: &ChatWidget) {
        let line = if self.use_color {
            format!("{ANSI_DIM}[{}]{ANSI_RESET}", widget.status_label())
        } else {
            format!("[{}]", widget.status_label())
        };
        self.write_line(&line);
    }

    fn print_info(&mut self, info: &str) {
        self.write_line(info);
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error:{ANSI_RESET} {error}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
