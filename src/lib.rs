#![forbid(unsafe_code)]
//! tarnc — the semantic analyzer for the tarn systems language.
//!
//! This crate is the core described in the design notes: a lexer and recursive-descent parser
//! build a [`tarnc_syntax::Ast`] over a [`frontend::module::Module`], and [`analyzer::Analyzer`]
//! walks it in two passes (declaration collection, then expression/statement checking) to produce
//! a fully typed tree ready for a code generator this crate does not implement.
//!
//! ## Panic policy
//!
//! - Analyzer and parser code report failures through `Result`/the diagnostic sink, never by
//!   unwinding — a single run is expected to surface every problem in a module, not just the
//!   first.
//! - `.expect("...")` is reserved for genuine internal invariants (a signature collection pass
//!   that didn't run, a node shape the dispatcher already matched on) — a panic there means a
//!   compiler bug, not a source-language error.
//! - `.unwrap()`/`.expect()` are unrestricted in `#[cfg(test)]` code.

pub mod analyzer;
pub mod cli;
pub mod frontend;

pub use frontend::diagnostics;
pub use frontend::module;
