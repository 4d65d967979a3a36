use quill_core::Diagnostic;

/// Renders the driver's plain-text report: one line per diagnostic in
/// detection order, then a closing success line when no errors were found.
pub fn render_text(diagnostics: &[Diagnostic], content: &str, ok: bool) -> String {
    let mut out = String::new();

    for diagnostic in diagnostics {
        let (line, col) = diagnostic.location.line_col(content);
        out.push_str(&format!(
            "{}: {} (line {line}, col {col})\n",
            diagnostic.severity, diagnostic.message
        ));
    }

    if ok {
        out.push_str("no errors found\n");
    }

    out
}

pub fn render_json(diagnostics: &[Diagnostic]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(diagnostics).map(|mut rendered| {
        rendered.push('\n');
        rendered
    })
}
