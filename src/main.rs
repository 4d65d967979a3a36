mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use quill_core::Severity;
use quill_semantic::SemanticAnalyzer;
use quill_token::{Lexer, Tokens};

/// Static checker for Quill source files.
///
/// Exits 0 when the file has no error-severity diagnostics; warnings are
/// reported but never fail the run.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Source file to analyze
    input: PathBuf,

    /// Write the report to this file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit diagnostics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode diagnostics: {0}")]
    Encode(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool, DriverError> {
    let content = std::fs::read_to_string(&cli.input).map_err(|source| DriverError::Read {
        path: cli.input.clone(),
        source,
    })?;

    let tokens = Lexer::new(&content).collect();
    let tokens = Tokens::new(tokens, content.len());
    let ast = quill_syntax::Parser::new(tokens).parse();
    let info = SemanticAnalyzer::new(&content).analyze(&ast);

    let ok = !info
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity == Severity::Error);

    let rendered = match cli.json {
        true => report::render_json(&info.diagnostics)?,
        false => report::render_text(&info.diagnostics, &content, ok),
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered).map_err(|source| DriverError::Write {
            path: path.clone(),
            source,
        })?,
        None => print!("{rendered}"),
    }

    Ok(ok)
}
