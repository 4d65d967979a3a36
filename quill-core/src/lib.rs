pub mod diagnostics;
pub mod location;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use location::Location;
