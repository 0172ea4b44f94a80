//! The `Module`: the unit of compilation passed to the semantic analyzer.
//!
//! Owns the source text, the parsed [`Ast`] arena, the [`ScopeTree`] built over it, and the
//! import/export lists the module import resolver and analyzer coordinate over (spec §3/§6).

use std::rc::Rc;

use tarnc_core::TypeArena;
use tarnc_syntax::{Ast, NodeId, ScopeTree};

/// An import as the parser leaves it: just a name. The module import resolver (an external
/// collaborator — see [`crate::analyzer::imports::ImportResolver`]) is responsible for turning
/// this into a populated export list before the analyzer inserts its symbols into scope.
#[derive(Debug, Clone)]
pub struct Import {
    pub name: Rc<str>,
}

/// A name this module makes available to importers. Populated by the declaration-collection
/// pass as it walks top-level `Function`/`Declaration`/`StructDeclaration` nodes marked for
/// export.
#[derive(Debug, Clone)]
pub struct Export {
    pub name: Rc<str>,
    pub node: NodeId,
}

pub struct Module {
    pub filename: Rc<str>,
    pub source: String,
    pub ast: Ast,
    pub types: TypeArena,
    pub scopes: ScopeTree,
    pub root: NodeId,
    pub imports: Vec<Import>,
    pub exports: Vec<Export>,
    /// `(module_name, export_name)` pairs installed by [`crate::analyzer::imports::apply_imports`],
    /// so a `module.member` access can tell a genuine export from a name that merely collides
    /// with one in the flat global scope.
    pub imported_members: Vec<(Rc<str>, Rc<str>)>,
}

impl Module {
    pub fn new(filename: impl Into<Rc<str>>, source: String, ast: Ast, root: NodeId) -> Self {
        Self {
            filename: filename.into(),
            source,
            ast,
            types: TypeArena::new(),
            scopes: ScopeTree::new(),
            root,
            imports: Vec::new(),
            exports: Vec::new(),
            imported_members: Vec::new(),
        }
    }
}
