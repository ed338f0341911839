use crate::error::{CertSplitError, UserFriendlyError};
use crate::sink::SinkReport;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
}

impl OutputMode {
    /// Human output when stderr is a colour terminal, plain otherwise.
    pub fn detect() -> Self {
        if Term::stderr().features().colors_supported() {
            OutputMode::Human
        } else {
            OutputMode::Plain
        }
    }
}

static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");

/// Diagnostics printer. Everything goes to stderr; stdout carries artifact
/// data only.
pub struct OutputFormatter {
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stderr();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            OutputMode::Plain => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn error(&self, message: &str) {
        // Errors are printed even in quiet mode.
        self.print_message(MessageType::Error, message);
    }

    pub fn success(&self, message: &str) {
        if self.should_show_message(1) {
            self.print_message(MessageType::Success, message);
        }
    }

    pub fn print_user_friendly_error(&self, error: &CertSplitError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            if self.quiet {
                return;
            }
            let line = format!("Suggestion: {}", suggestion);
            if self.use_colors {
                self.write_line(&format!("{}{}", INFO, style(line).cyan()));
            } else {
                self.write_line(&line);
            }
        }
    }

    pub fn print_sink_summary(&self, report: &SinkReport) {
        if !self.should_show_message(1) || report.files_written.is_empty() {
            return;
        }

        self.success(&format!(
            "Wrote {} files ({} bytes)",
            report.files_written.len(),
            report.bytes_written
        ));

        if self.should_show_message(2) {
            for path in &report.files_written {
                self.write_line(&format!("  {}", path.display()));
            }
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_message(&self, msg_type: MessageType, message: &str) {
        let line = match (self.mode, self.use_colors) {
            (OutputMode::Human, true) => {
                let (emoji, styled) = match msg_type {
                    MessageType::Error => (CROSS, style(message).red().bold()),
                    MessageType::Success => (CHECKMARK, style(message).green()),
                };
                format!("{}{}", emoji, styled)
            }
            (OutputMode::Human, false) => format!("{} {}", msg_type.symbol(), message),
            (OutputMode::Plain, _) => format!("{}: {}", msg_type.label(), message),
        };

        self.write_line(&line);
    }

    fn write_line(&self, line: &str) {
        // Nothing sensible to do if stderr itself is gone.
        let _ = self.term.write_line(line);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Error,
    Success,
}

impl MessageType {
    fn symbol(self) -> &'static str {
        match self {
            MessageType::Error => "✗",
            MessageType::Success => "✓",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MessageType::Error => "ERROR",
            MessageType::Success => "SUCCESS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert_eq!(formatter.mode, OutputMode::Plain);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(!formatter.use_colors);
        assert!(!formatter.should_show_message(0));
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));
    }

    #[test]
    fn test_message_labels() {
        assert_eq!(MessageType::Error.label(), "ERROR");
        assert_eq!(MessageType::Success.label(), "SUCCESS");
        assert_eq!(MessageType::Error.symbol(), "✗");
    }
}
