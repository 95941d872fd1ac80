//! Structured diagnostic messages with severity, codes, and source paths.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A structured diagnostic message, optionally annotated with a source path.
///
/// Diagnostics are the primary mechanism for reporting build progress and
/// problems to the user. Unlike compiler diagnostics they point at files
/// (inputs, projects, cache artifacts), not at byte ranges within them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The file or directory the diagnostic refers to, if any.
    pub source: Option<PathBuf>,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            source: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new info diagnostic.
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    /// Creates a new success diagnostic.
    pub fn success(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, code, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Attaches the source path this diagnostic refers to.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_warning() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Input, 102),
            "unsupported input dropped",
        );
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "unsupported input dropped");
        assert!(diag.source.is_none());
        assert_eq!(format!("{}", diag.code), "I102");
    }

    #[test]
    fn create_error_with_source() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Build, 501),
            "no valid input remains",
        )
        .with_source("out/api");
        assert!(diag.severity.is_error());
        assert_eq!(diag.source.as_deref(), Some(std::path::Path::new("out/api")));
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Compile, 301),
            "duplicate type discarded",
        )
        .with_source("src/A.cs")
        .with_note("kept declaration from src/B.cs");
        assert_eq!(diag.notes.len(), 1);
        assert!(diag.source.is_some());
    }

    #[test]
    fn info_and_success_levels() {
        let code = DiagnosticCode::new(Category::Build, 1);
        assert_eq!(Diagnostic::info(code, "m").severity, Severity::Info);
        assert_eq!(Diagnostic::success(code, "m").severity, Severity::Success);
    }
}
