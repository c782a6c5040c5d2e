//! Colored terminal output for the serve command.

use console::{Style, Term};

/// Terminal output formatter (writes to stderr).
pub(crate) struct Output {
    term: Term,
    label: Style,
    green: Style,
    yellow: Style,
    red: Style,
    banner: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            banner: Style::new().cyan().bold(),
        }
    }

    fn write(&self, line: &str) {
        let _ = self.term.write_line(line);
    }

    /// Print the address the server is about to listen on.
    pub(crate) fn banner(&self, host: &str, port: u16) {
        let line = format!("devreload serving http://{host}:{port}");
        self.write(&self.banner.apply_to(line).to_string());
    }

    /// Print one `label: value` line of the startup summary.
    pub(crate) fn setting(&self, label: &str, value: &str) {
        let label = self.label.apply_to(format!("{label}:"));
        self.write(&format_setting(&label.to_string(), value));
    }

    /// Confirm a manual reload.
    pub(crate) fn reload_triggered(&self, value: u64) {
        let line = format!("Reload triggered ({value})");
        self.write(&self.green.apply_to(line).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        self.write(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.write(&self.red.apply_to(msg).to_string());
    }
}

fn format_setting(label: &str, value: &str) -> String {
    format!("  {label} {value}")
}
