//! The syntax tree, scope chains and symbol tables shared between the parser and the semantic
//! analyzer.
//!
//! This crate owns the *shape* of a parsed module — [`ast::Ast`]'s node arena and
//! [`scope::ScopeTree`]'s symbol tables — but not the `Module` wrapper that also carries source
//! text, a filename and an import/export list; that lives in the root crate alongside the
//! analyzer that consumes it.

pub mod ast;
pub mod scope;

pub use ast::{Ast, BinaryOp, Literal, Node, NodeId, NodeKind, ParamDecl, StructMemberDecl, TypeExpr, UnaryOp};
pub use scope::{Linkage, ScopeId, ScopeTree, Symbol, SymbolKind};
