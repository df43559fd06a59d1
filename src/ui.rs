use chrono::{DateTime, Utc};
use colored::Colorize;
use reconcile::{Diagnostic, Diagnostics, Redactor, Severity};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print every diagnostic, prefixed with the instance it belongs to
pub fn diagnostics(scope: &str, diagnostics: &Diagnostics, redactor: &Redactor) {
    for diagnostic in diagnostics {
        let line = format_diagnostic(scope, diagnostic);
        let line = redactor.redact(&line);
        match diagnostic.severity {
            Severity::Error => error(&line),
            Severity::Warning => warn(&line),
        }
    }
}

fn format_diagnostic(scope: &str, diagnostic: &Diagnostic) -> String {
    let mut line = if scope.is_empty() {
        diagnostic.summary.clone()
    } else {
        format!("{scope}: {}", diagnostic.summary)
    };
    if let Some(attribute) = &diagnostic.attribute {
        line.push_str(&format!(" ({attribute})"));
    }
    if !diagnostic.detail.is_empty() {
        line.push_str(&format!("\n    {}", diagnostic.detail));
    }
    line
}

/// Render an update stamp the way the Xata console shows it (RFC 850)
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%A, %d-%b-%y %H:%M:%S UTC").to_string()
}

// ============================================================================
// Tests
// ============================================================================
