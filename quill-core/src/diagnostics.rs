use serde::Serialize;

use crate::Location;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum DiagnosticKind {
    SyntaxError,
    UndeclaredIdentifier,
    Redeclaration,
    TypeMismatch,
    ArityMismatch,
    InvalidOperation,
    ConstReassignment,
    MissingReturn,
}

/// Append-only collector. Order of emission is order of detection; nothing
/// is removed once pushed.
#[derive(Debug, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, kind: DiagnosticKind, location: Location, message: impl Into<String>) {
        self.0.push(Diagnostic {
            location,
            severity: Severity::Error,
            kind,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, kind: DiagnosticKind, location: Location, message: impl Into<String>) {
        self.0.push(Diagnostic {
            location,
            severity: Severity::Warning,
            kind,
            message: message.into(),
        });
    }

    pub fn items(self) -> Vec<Diagnostic> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.0
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}
