//! Everything upstream of the semantic analyzer: tokenizing source text, parsing it into the
//! `tarnc_syntax` arena, and the `Module`/diagnostics types the analyzer consumes and reports
//! through.

pub mod diagnostics;
pub mod lexer;
pub mod module;
pub mod parser;

use std::rc::Rc;

use diagnostics::CompileError;
use lexer::Lexer;
use module::Module;
use parser::Parser;

/// Tokenize and parse `source` into a [`Module`] ready for [`crate::analyzer::Analyzer`]. The one
/// entry point that chains the lexer and parser the way every caller (CLI, tests) needs them.
pub fn build_module(filename: impl Into<Rc<str>>, source: String) -> Result<Module, Vec<CompileError>> {
    let tokens = Lexer::new(&source).tokenize()?;
    let parsed = Parser::new(&tokens).parse()?;
    let filename = filename.into();
    Ok(Module::new(filename, source, parsed.ast, parsed.root))
}
