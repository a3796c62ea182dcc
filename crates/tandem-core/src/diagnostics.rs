//! Diagnostics produced by both translation stages and their aggregation.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "INFO", alias = "Info")]
    Info,
    #[serde(alias = "WARNING", alias = "Warning", alias = "warn", alias = "WARN")]
    Warning,
    #[serde(alias = "ERROR", alias = "Error")]
    Error,
}

/// Which stage emitted a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Compile,
    Transpile,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile => f.write_str("compile"),
            Self::Transpile => f.write_str("transpile"),
        }
    }
}

/// A location in a source or class file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File the diagnostic points at
    pub file: PathBuf,

    /// Line number (1-indexed)
    pub line: usize,
}

/// A single message from one of the stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub origin: Origin,
    pub message: String,

    /// Primary location, when the tool reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,

    /// Continuation text (source excerpt, caret line, stack)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, origin: Origin, message: impl Into<String>) -> Self {
        Self {
            severity,
            origin,
            message: message.into(),
            location: None,
            detail: None,
        }
    }

    pub fn error(origin: Origin, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, origin, message)
    }

    pub fn warning(origin: Origin, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, origin, message)
    }

    pub fn info(origin: Origin, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, origin, message)
    }

    pub fn at(mut self, file: impl Into<PathBuf>, line: usize) -> Self {
        self.location = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Append a continuation line to `detail`.
    pub fn push_detail(&mut self, line: &str) {
        match &mut self.detail {
            Some(detail) => {
                detail.push('\n');
                detail.push_str(line);
            }
            None => self.detail = Some(line.to_string()),
        }
    }

    /// Format the diagnostic for terminal display.
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        let level_str = match self.severity {
            Severity::Error => "\x1b[1;31merror\x1b[0m",
            Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            Severity::Info => "\x1b[1;36minfo\x1b[0m",
        };

        output.push_str(&format!("{level_str}[{}]: {}\n", self.origin, self.message));

        if let Some(loc) = &self.location {
            output.push_str(&format!(
                "  \x1b[1;34m-->\x1b[0m {}:{}\n",
                loc.file.display(),
                loc.line
            ));
        }

        if let Some(detail) = &self.detail {
            for line in detail.lines() {
                output.push_str(&format!("   | {line}\n"));
            }
        }

        output
    }
}

/// What one stage hands back to the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutcome {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl StageOutcome {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Merged view of both stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Merge compile and (optional) transpile outcomes.
///
/// Compile diagnostics precede transpile diagnostics; emission order is kept
/// inside each stage. Nothing is deduplicated. Any `Error` diagnostic fails
/// the aggregate even when a stage claimed success.
pub fn aggregate(compile: StageOutcome, transpile: Option<StageOutcome>) -> Aggregate {
    let mut success = compile.success;
    let mut diagnostics = compile.diagnostics;

    if let Some(transpile) = transpile {
        success &= transpile.success;
        diagnostics.extend(transpile.diagnostics);
    }

    if diagnostics.iter().any(Diagnostic::is_error) {
        success = false;
    }

    Aggregate {
        success,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, diagnostics: Vec<Diagnostic>) -> StageOutcome {
        StageOutcome {
            success,
            diagnostics,
        }
    }

    #[test]
    fn test_stage_then_emission_order() {
        let c1 = Diagnostic::info(Origin::Compile, "c1");
        let c2 = Diagnostic::warning(Origin::Compile, "c2");
        let t1 = Diagnostic::info(Origin::Transpile, "t1");
        let t2 = Diagnostic::info(Origin::Transpile, "t2");

        let merged = aggregate(
            outcome(true, vec![c1.clone(), c2.clone()]),
            Some(outcome(true, vec![t1.clone(), t2.clone()])),
        );

        assert!(merged.success);
        assert_eq!(merged.diagnostics, vec![c1, c2, t1, t2]);
    }

    #[test]
    fn test_error_overrides_stage_boolean() {
        let merged = aggregate(
            outcome(true, Vec::new()),
            Some(outcome(true, vec![Diagnostic::error(Origin::Transpile, "boom")])),
        );
        assert!(!merged.success);
    }

    #[test]
    fn test_absent_transpile_uses_compile_result() {
        let merged = aggregate(outcome(false, Vec::new()), None);
        assert!(!merged.success);

        let merged = aggregate(outcome(true, Vec::new()), None);
        assert!(merged.success);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let d = Diagnostic::warning(Origin::Compile, "same");
        let merged = aggregate(outcome(true, vec![d.clone(), d.clone()]), None);
        assert_eq!(merged.diagnostics.len(), 2);
    }

    #[test]
    fn test_format_terminal() {
        let mut diagnostic =
            Diagnostic::error(Origin::Compile, "';' expected").at("Hello.java", 3);
        diagnostic.push_detail("    int x = 1");
        diagnostic.push_detail("             ^");

        let formatted = diagnostic.format_terminal();
        assert!(formatted.contains("error"));
        assert!(formatted.contains("[compile]"));
        assert!(formatted.contains("Hello.java:3"));
        assert!(formatted.contains("   |              ^"));
    }

    #[test]
    fn test_json_shape() {
        let diagnostic = Diagnostic::warning(Origin::Transpile, "unused");
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["origin"], "transpile");
        assert!(json.get("location").is_none());
    }
}
