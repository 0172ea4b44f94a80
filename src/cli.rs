//! Command-line front end: `tarnc lex|parse|check <file>`.
//!
//! Thin by design — everything interesting lives in [`crate::frontend`] and [`crate::analyzer`];
//! this module's only job is turning a file path and a subcommand into calls against that core and
//! a process exit code.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser as ClapParser, Subcommand};
use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::analyzer::Analyzer;
use crate::frontend;
use crate::frontend::diagnostics::ConsoleSink;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser as TarnParser;

#[derive(ClapParser)]
#[command(name = "tarnc", version, about = "Semantic analyzer front end for the tarn systems language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tokenize a source file and print its token stream.
    Lex { path: PathBuf },
    /// Parse a source file and print its node count, or its syntax errors.
    Parse { path: PathBuf },
    /// Run declaration collection and expression checking, reporting every diagnostic.
    Check { path: PathBuf },
}

#[derive(Debug, Error, MietteDiagnostic)]
enum CliError {
    #[error("could not read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{} syntax error(s)", errors.len())]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        errors: Vec<frontend::diagnostics::CompileError>,
        #[label(collection, "here")]
        labels: Vec<SourceSpan>,
    },
}

fn read_source(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn syntax_error(filename: &str, source: String, errors: Vec<frontend::diagnostics::CompileError>) -> CliError {
    let labels = errors.iter().map(|e| SourceSpan::from(e.span.start as usize..e.span.end as usize)).collect();
    CliError::Syntax {
        src: NamedSource::new(filename, source),
        errors,
        labels,
    }
}

/// Parses arguments and runs the requested subcommand. Returns the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Lex { path } => lex(path),
        Command::Parse { path } => parse(path),
        Command::Check { path } => check(path),
    };
    match result {
        Ok(ok) => i32::from(!ok),
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            1
        }
    }
}

fn lex(path: &PathBuf) -> Result<bool, CliError> {
    let source = read_source(path)?;
    match Lexer::new(&source).tokenize() {
        Ok(tokens) => {
            for token in &tokens {
                println!("{:?}", token);
            }
            Ok(true)
        }
        Err(errors) => Err(syntax_error(&path.display().to_string(), source, errors)),
    }
}

fn parse(path: &PathBuf) -> Result<bool, CliError> {
    let source = read_source(path)?;
    let tokens = Lexer::new(&source).tokenize().map_err(|e| syntax_error(&path.display().to_string(), source.clone(), e))?;
    match TarnParser::new(&tokens).parse() {
        Ok(parsed) => {
            println!("parsed {} top-level item(s)", node_child_count(&parsed));
            Ok(true)
        }
        Err(errors) => Err(syntax_error(&path.display().to_string(), source, errors)),
    }
}

fn node_child_count(parsed: &frontend::parser::ParsedModule) -> usize {
    match &parsed.ast.get(parsed.root).kind {
        tarnc_syntax::NodeKind::Root { children } => children.len(),
        _ => 0,
    }
}

fn check(path: &PathBuf) -> Result<bool, CliError> {
    let filename: Rc<str> = Rc::from(path.display().to_string());
    let source = read_source(path)?;
    let source_for_errors = source.clone();
    let mut module = frontend::build_module(filename, source)
        .map_err(|e| syntax_error(&path.display().to_string(), source_for_errors, e))?;

    let source_text = module.source.clone();
    let mut sink = ConsoleSink::new(&source_text);
    let ok = Analyzer::new(&mut module, &mut sink).check_module();
    Ok(ok)
}
