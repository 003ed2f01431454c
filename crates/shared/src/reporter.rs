//! Operator-facing progress reporting

use console::style;

/// Reporter interface for dependency injection
///
/// Everything an operator should read goes through here; developer
/// diagnostics go through `tracing` instead.
pub trait StatusReporter: Send + Sync {
    /// A stage is starting
    fn step(&self, message: &str);
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
    fn failure(&self, message: &str);
    /// Indented supporting text (sizes, paths, captured output)
    fn detail(&self, message: &str);
}

/// Console reporter with styled status markers on stderr
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn step(&self, message: &str) {
        eprintln!("{} {}", style("→").cyan().bold(), message);
    }

    fn success(&self, message: &str) {
        eprintln!("{} {}", style("✓").green().bold(), message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
    }

    fn failure(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), style(message).red());
    }

    fn detail(&self, message: &str) {
        for line in message.lines() {
            eprintln!("    {}", style(line).dim());
        }
    }
}

/// No-op reporter for testing
#[derive(Debug, Clone, Default)]
pub struct NullReporter;

impl StatusReporter for NullReporter {
    fn step(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn failure(&self, _message: &str) {}
    fn detail(&self, _message: &str) {}
}

/// Bytes of captured output shown to an operator as diagnostic
pub const DIAGNOSTIC_LIMIT: usize = 16 * 1024;

/// Lossy text of captured output, truncated for display
pub fn diagnostic_text(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() <= DIAGNOSTIC_LIMIT {
        return text;
    }
    let mut cut = DIAGNOSTIC_LIMIT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let dropped = text.len() - cut;
    text.truncate(cut);
    text.push_str(&format!("\n... ({} more bytes)", dropped));
    text
}

/// Human-readable byte size, e.g. `12.4 MB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}
