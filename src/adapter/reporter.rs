use colored::{ColoredString, Colorize};

use crate::domain::outbound::DiagnosticReporter;

/// A [`DiagnosticReporter`] printing colored diagnostics to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    fn paint_warning(message: &str) -> ColoredString {
        message.bright_yellow()
    }

    fn paint_error(message: &str) -> ColoredString {
        message.bright_red()
    }
}

impl DiagnosticReporter for ConsoleReporter {
    fn warning(&self, message: &str) {
        eprintln!("{}", Self::paint_warning(message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", Self::paint_error(message));
    }
}
