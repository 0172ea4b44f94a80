//! The semantic analyzer: type checking, implicit conversion insertion, layout computation,
//! intrinsic recognition, cross-module symbol resolution and name-based overload resolution
//! with bidirectional inference (see the crate root docs for the module map).
//!
//! Entry point is [`Analyzer::check_module`], which runs the two-pass architecture spec §2
//! describes: [`collect`] walks top-level declarations first so every sibling function overload
//! and struct type is visible regardless of declaration order, then [`check_expr`] walks bodies
//! and expressions, driven by the same scope-chain machinery the overload resolver needs.
//!
//! Every recursive check takes an explicit [`tarnc_syntax::ScopeId`] rather than consulting a
//! side table — a node's scope is just whatever its caller is already carrying, which is exactly
//! `F.scope` in spec §4.3's "walk scope chain from F.scope outward".

pub mod check_expr;
mod collect;
pub mod imports;
pub mod intrinsics;
pub mod overload;

use tarnc_core::TypeId;
use tarnc_syntax::NodeId;

use crate::frontend::diagnostics::{Diagnostic, DiagnosticSink, Severity};
use crate::frontend::module::Module;
use imports::{ImportResolver, NullImportResolver};

pub struct Analyzer<'a> {
    pub module: &'a mut Module,
    pub sink: &'a mut dyn DiagnosticSink,
}

impl<'a> Analyzer<'a> {
    pub fn new(module: &'a mut Module, sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { module, sink }
    }

    /// Run both passes against a module with no imports (or imports the caller doesn't care to
    /// resolve). Returns `true` iff no error-severity diagnostic was reported.
    pub fn check_module(&mut self) -> bool {
        self.check_module_with_imports(&NullImportResolver)
    }

    /// Run both passes, installing `resolver`'s answers for every `import` declaration into the
    /// global scope (spec §6) before the expression-checking pass begins.
    pub fn check_module_with_imports(&mut self, resolver: &dyn ImportResolver) -> bool {
        collect::collect(self);
        imports::apply_imports(self, resolver);
        let global = self.module.scopes.global();
        let root = self.module.root;
        check_expr::check_expression(self, root, global);
        !self.sink.had_errors()
    }

    pub fn error(&mut self, node: NodeId, message: impl Into<String>) {
        let span = self.module.ast.get(node).span;
        let filename = self.module.filename.clone();
        self.sink.report(Diagnostic::new(Severity::Error, filename, span, message));
    }

    pub fn warning(&mut self, node: NodeId, message: impl Into<String>) {
        let span = self.module.ast.get(node).span;
        let filename = self.module.filename.clone();
        self.sink.report(Diagnostic::new(Severity::Warning, filename, span, message));
    }

    pub fn sorry(&mut self, node: NodeId, message: impl Into<String>) {
        let span = self.module.ast.get(node).span;
        let filename = self.module.filename.clone();
        self.sink.report(Diagnostic::new(Severity::Sorry, filename, span, message));
    }

    /// Human-readable rendering of a type for diagnostics. Deliberately simple; codegen never
    /// sees this.
    pub fn describe_type(&self, ty: TypeId) -> String {
        describe_type(&self.module.types, ty)
    }
}

fn describe_type(types: &tarnc_core::TypeArena, ty: TypeId) -> String {
    use tarnc_core::{Primitive, Type};
    match types.get(ty) {
        Type::Primitive(Primitive::Void) => "void".to_string(),
        Type::Primitive(Primitive::Byte) => "byte".to_string(),
        Type::Primitive(Primitive::Integer) => "integer".to_string(),
        Type::Primitive(Primitive::IntegerLiteral) => "integer_literal".to_string(),
        Type::Integer { bits, signed } => format!("{}{}", if *signed { "i" } else { "u" }, bits),
        Type::Pointer(inner) => format!("@{}", describe_type(types, *inner)),
        Type::Reference(inner) => format!("&{}", describe_type(types, *inner)),
        Type::Array { element, len } => format!("{}[{}]", describe_type(types, *element), len),
        Type::Function(f) => {
            let params: Vec<String> = f.params.iter().map(|p| describe_type(types, p.ty)).collect();
            format!("{}({})", describe_type(types, f.return_type), params.join(", "))
        }
        Type::Struct(s) => s.name.to_string(),
        Type::Named(n) => n.name.to_string(),
    }
}
