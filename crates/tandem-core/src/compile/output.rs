//! Translation of front-end compiler text output into diagnostics.
//!
//! Understands the classic `javac` layout:
//!
//! ```text
//! [parsing started SimpleFileObject[/input/Hello.java]]
//! Hello.java:3: error: ';' expected
//!         int x = 1
//!                  ^
//! 1 error
//! ```

use crate::diagnostics::{Diagnostic, Origin, Severity};

const LEVELS: [(&str, Severity); 3] = [
    ("error", Severity::Error),
    ("warning", Severity::Warning),
    ("note", Severity::Info),
];

/// Parse compiler output, preserving emission order.
pub fn parse_compiler_output(text: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    // Index of the diagnostic that continuation lines belong to
    let mut current: Option<usize> = None;

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if let Some(progress) = verbose_progress(line) {
            diagnostics.push(Diagnostic::info(Origin::Compile, progress));
            current = None;
            continue;
        }

        if is_summary(line) {
            current = None;
            continue;
        }

        if let Some(diagnostic) = parse_located(line).or_else(|| parse_bare(line)) {
            diagnostics.push(diagnostic);
            current = Some(diagnostics.len() - 1);
            continue;
        }

        match current {
            Some(index) => diagnostics[index].push_detail(line),
            None => {
                tracing::debug!("Unclassified compiler output: {}", line);
                diagnostics.push(Diagnostic::info(Origin::Compile, line.trim()));
            }
        }
    }

    diagnostics
}

/// `[parsing started ...]`, `[wrote ...]`, `[total 412ms]`
fn verbose_progress(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
}

/// `1 error`, `3 warnings`
fn is_summary(line: &str) -> bool {
    let mut parts = line.trim().splitn(2, ' ');
    let count = parts.next().unwrap_or_default();
    let noun = parts.next().unwrap_or_default();
    !count.is_empty()
        && count.chars().all(|c| c.is_ascii_digit())
        && matches!(noun, "error" | "errors" | "warning" | "warnings")
}

/// `path/Hello.java:3: error: message`
fn parse_located(line: &str) -> Option<Diagnostic> {
    for (level, severity) in LEVELS {
        let marker = format!(": {level}: ");
        let Some(index) = line.find(&marker) else {
            continue;
        };

        let (file, line_number) = line[..index].rsplit_once(':')?;
        let line_number = line_number.trim().parse::<usize>().ok()?;
        if file.is_empty() {
            return None;
        }

        let message = &line[index + marker.len()..];
        return Some(Diagnostic::new(severity, Origin::Compile, message).at(file, line_number));
    }
    None
}

/// `error: file not found: X.java`, `warning: [options] ...`, `Note: ...`
fn parse_bare(line: &str) -> Option<Diagnostic> {
    for (level, severity) in LEVELS {
        let Some(prefix) = line.get(..level.len() + 1) else {
            continue;
        };
        if prefix.to_ascii_lowercase() == format!("{level}:") {
            let message = line[level.len() + 1..].trim();
            return Some(Diagnostic::new(severity, Origin::Compile, message));
        }
    }
    None
}
