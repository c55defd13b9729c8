//! Terminal output formatting.

use crate::error::Result;
use colored::Colorize;
use serde::Serialize;

/// Formats command results for the terminal, honoring the `--json` and
/// `--no-color` flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    json: bool,
    color: bool,
}

impl OutputFormatter {
    #[must_use]
    pub const fn new(json: bool, no_color: bool) -> Self {
        Self {
            json,
            color: !no_color,
        }
    }

    /// True when results should be emitted as JSON documents.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if self.color {
            println!("{} {message}", "✓".green());
        } else {
            println!("{message}");
        }
    }

    pub fn info(&self, message: &str) {
        if self.color {
            println!("{}", message.bright_black());
        } else {
            println!("{message}");
        }
    }

    pub fn error(&self, message: &str) {
        if self.color {
            eprintln!("{} {}", "✗".red(), message.red());
        } else {
            eprintln!("{message}");
        }
    }

    /// Print a value as pretty JSON on stdout.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
