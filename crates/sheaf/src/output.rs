//! Terminal output for the render command.
//!
//! Status lines and diagnostics go to stderr so stdout carries only HTML.

use console::{Style, Term};
use sheaf_renderer::Diagnostic;

pub(crate) struct Output {
    status: Term,
    html: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            html: Term::stdout(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print a dimmed status line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.status.write_line(&self.dim.apply_to(msg).to_string());
    }

    pub(crate) fn success(&self, msg: &str) {
        let _ = self.status.write_line(&self.green.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.status.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print contained render failures, one warning per line, then a count.
    pub(crate) fn diagnostics(&self, diagnostics: &[Diagnostic]) {
        if diagnostics.is_empty() {
            return;
        }
        for diagnostic in diagnostics {
            let line = format!("warning: {diagnostic}");
            let _ = self.status.write_line(&self.yellow.apply_to(line).to_string());
        }
        let summary = match diagnostics.len() {
            1 => "1 diagnostic".to_owned(),
            n => format!("{n} diagnostics"),
        };
        let _ = self.status.write_line(&self.yellow.apply_to(summary).to_string());
    }

    /// Write rendered HTML to stdout.
    pub(crate) fn html(&self, html: &str) -> std::io::Result<()> {
        self.html.write_line(html)
    }
}
