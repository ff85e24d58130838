use std::io::Read;

use miette::{Diagnostic, IntoDiagnostic, NamedSource, Result, SourceSpan};
use thiserror::Error;
use yarrow_parser::{Event, Marker, Parser, ScanError};

/// Check that YAML files are well-formed.
///
/// Each file given on the command line (or the standard input if none) is parsed to its end. The
/// first syntax error of a file is reported with the offending source.
fn main() -> Result<()> {
    let args: Vec<_> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        eprintln!("Usage: yarrow-check [file.yaml...]");
        return Ok(());
    }

    let mut failed = false;
    if args.is_empty() {
        let mut contents = String::new();
        std::io::stdin()
            .read_to_string(&mut contents)
            .into_diagnostic()?;
        failed |= !check("<stdin>", contents);
    } else {
        for filename in &args {
            let contents = std::fs::read_to_string(filename).into_diagnostic()?;
            failed |= !check(filename, contents);
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Parse `contents`, printing a summary or the error. Return whether the stream is well-formed.
fn check(name: &str, contents: String) -> bool {
    match count_documents(&contents) {
        Ok(1) => {
            println!("{name}: ok, 1 document");
            true
        }
        Ok(n) => {
            println!("{name}: ok, {n} documents");
            true
        }
        Err(error) => {
            let report = miette::Report::new(SyntaxError::new(name, contents, &error));
            eprintln!("{report:?}");
            false
        }
    }
}

fn count_documents(contents: &str) -> Result<usize, ScanError> {
    let mut documents = 0;
    for event in Parser::new_from_str(contents) {
        if let (Event::DocumentStart { .. }, _) = event? {
            documents += 1;
        }
    }
    Ok(documents)
}

#[derive(Error, Debug, Diagnostic)]
#[error("{info}")]
#[diagnostic(code(yarrow::syntax))]
struct SyntaxError {
    info: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[label("{context}")]
    context_span: Option<SourceSpan>,
    context: String,
}

impl SyntaxError {
    fn new(name: &str, contents: String, error: &ScanError) -> Self {
        let span = label_at(&contents, error.marker());
        let (context, context_span) = match error.context() {
            Some((context, mark)) => (context.to_owned(), Some(label_at(&contents, mark))),
            None => (String::new(), None),
        };
        SyntaxError {
            info: error.info().to_owned(),
            src: NamedSource::new(name, contents),
            span,
            context_span,
            context,
        }
    }
}

/// Build a one-character span at `mark`.
///
/// Markers count characters while miette expects byte offsets.
fn label_at(contents: &str, mark: &Marker) -> SourceSpan {
    match contents.char_indices().nth(mark.index()) {
        Some((offset, c)) => (offset, c.len_utf8()).into(),
        None => (contents.len(), 0).into(),
    }
}
