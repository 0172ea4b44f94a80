//! Diagnostics: the lexer/parser's lightweight `CompileError`, and the richer `Diagnostic`/
//! `DiagnosticSink` abstraction the semantic analyzer reports through (see spec §6/§7: "a single
//! operation the analyzer invokes with severity, filename, source span, and a formatted
//! message").
//!
//! The analyzer never panics or returns `Result` up through a call stack on a semantic error —
//! every checker keeps going after reporting one, so a single run surfaces every problem in a
//! module rather than just the first. `CompileError` (syntax errors) still use `Result` because
//! an unparseable token stream genuinely can't produce a tree to keep checking.

use std::rc::Rc;

use tarnc_core::Span;

/// A lexer or parser failure. Unlike `Diagnostic`, these short-circuit: you can't keep parsing
/// past a syntax error with any confidence in the resulting tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
}

impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self { message, span }
    }
}

/// Severity levels the analyzer can report, per spec: error, warning, sorry (unimplemented
/// feature hit, not a bug), and info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    /// "Sorry, unimplemented" — a feature the language allows in principle but this compiler
    /// doesn't handle yet (e.g. integer widths above 64 bits).
    Sorry,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Sorry => write!(f, "sorry, unimplemented"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub filename: Rc<str>,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, filename: Rc<str>, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity,
            filename,
            span,
            message: message.into(),
        }
    }

    pub fn error(filename: Rc<str>, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, filename, span, message)
    }

    pub fn warning(filename: Rc<str>, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, filename, span, message)
    }

    pub fn sorry(filename: Rc<str>, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Sorry, filename, span, message)
    }
}

/// Where the analyzer sends diagnostics. Kept as a trait object seam so a test can swap in a
/// [`CollectingSink`] and the CLI can use [`ConsoleSink`] without the analyzer knowing which.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn had_errors(&self) -> bool;
}

/// Accumulates diagnostics in memory; what the analyzer's own test suite uses to assert on
/// emitted messages without touching stderr.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn had_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Prints diagnostics to stderr with source context, the CLI's default sink.
#[derive(Debug)]
pub struct ConsoleSink<'a> {
    source: &'a str,
    had_errors: bool,
}

impl<'a> ConsoleSink<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            had_errors: false,
        }
    }
}

impl<'a> DiagnosticSink for ConsoleSink<'a> {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.had_errors = true;
        }
        print_diagnostic(self.source, &diagnostic);
    }

    fn had_errors(&self) -> bool {
        self.had_errors
    }
}

fn print_diagnostic(source: &str, diagnostic: &Diagnostic) {
    let (line_num, col_num, line_text) = line_info(source, diagnostic.span.start as usize);

    let color = match diagnostic.severity {
        Severity::Error => "\x1b[31m",
        Severity::Warning | Severity::Sorry => "\x1b[33m",
        Severity::Info => "\x1b[36m",
    };
    let cyan = "\x1b[36m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    eprintln!("{bold}{color}{}{reset}{bold}: {}{reset}", diagnostic.severity, diagnostic.message);
    eprintln!("  {cyan}-->{reset} {}:{}:{}", diagnostic.filename, line_num, col_num);

    let width = line_num.to_string().len();
    eprintln!("  {cyan}{:>width$} |{reset}", "");
    eprintln!("  {cyan}{line_num:>width$} |{reset} {line_text}");

    let underline_len = (diagnostic.span.end.saturating_sub(diagnostic.span.start)).max(1) as usize;
    eprintln!("  {cyan}{:>width$} |{reset} {}{color}{}{reset}", "", " ".repeat(col_num - 1), "^".repeat(underline_len));
    eprintln!();
}

fn line_info(source: &str, offset: usize) -> (usize, usize, &str) {
    let offset = offset.min(source.len());
    let mut line_num = 1;
    let mut line_start = 0;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }
    let line_end = source[line_start..].find('\n').map(|i| line_start + i).unwrap_or(source.len());
    (line_num, offset - line_start + 1, &source[line_start..line_end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_tracks_error_presence() {
        let mut sink = CollectingSink::new();
        assert!(!sink.had_errors());
        sink.report(Diagnostic::warning(Rc::from("a.tarn"), Span::new(0, 1), "hm"));
        assert!(!sink.had_errors());
        sink.report(Diagnostic::error(Rc::from("a.tarn"), Span::new(0, 1), "bad"));
        assert!(sink.had_errors());
        assert_eq!(sink.errors().count(), 1);
    }
}
