//! Cross-module symbol resolution (spec §4.2 member-access / §6 module import resolver).
//!
//! Deserializing a precompiled module's export table is explicitly out of scope for the core (the
//! concrete on-disk format is a driver/linker concern); [`ImportResolver`] is the seam the driver
//! plugs a real implementation into. What the core owns is turning a resolver's answer into scope
//! symbols and synthesized function nodes, and rewriting `module.member` accesses to use them.

use std::rc::Rc;

use tarnc_core::FunctionAttrs;
use tarnc_syntax::{Linkage, NodeId, NodeKind, ScopeId, Symbol, SymbolKind, TypeExpr};

use super::collect::resolve_type_expr;
use super::check_expr::check_expression;
use super::Analyzer;

/// One function an import exports, described with the same [`TypeExpr`] vocabulary the parser
/// uses for declared types, since the resolver lives outside the importing module's type arena
/// and can't hand back a [`tarnc_core::TypeId`] directly.
#[derive(Debug, Clone)]
pub struct ExportedFunction {
    pub name: Rc<str>,
    pub return_type: TypeExpr,
    pub params: Vec<(Rc<str>, TypeExpr)>,
    pub attrs: FunctionAttrs,
}

/// The module import resolver: given the name written on an `import` declaration, yields that
/// module's exported functions. A real implementation reads a precompiled module's export table;
/// [`NullImportResolver`] is the trivial stand-in for single-module compilation.
pub trait ImportResolver {
    fn resolve(&self, import_name: &str) -> Vec<ExportedFunction>;
}

pub struct NullImportResolver;

impl ImportResolver for NullImportResolver {
    fn resolve(&self, _import_name: &str) -> Vec<ExportedFunction> {
        Vec::new()
    }
}

/// Installs every resolved import's exports into the global scope as `LINKAGE_IMPORTED` function
/// symbols, synthesizing a bodyless [`NodeKind::Function`] for each (spec §6). Must run after
/// [`super::collect::collect`] (so local declarations win name collisions the same way they would
/// against a second local overload) and before the expression-checking pass.
pub fn apply_imports(az: &mut Analyzer, resolver: &dyn ImportResolver) {
    let imports = az.module.imports.clone();
    let global = az.module.scopes.global();
    for import in &imports {
        for export in resolver.resolve(&import.name) {
            let return_type = resolve_type_expr(az, global, &export.return_type, az.module.root);
            let params: Vec<tarnc_syntax::ParamDecl> = export
                .params
                .iter()
                .map(|(name, texpr)| tarnc_syntax::ParamDecl {
                    name: name.clone(),
                    type_expr: texpr.clone(),
                    span: az.module.ast.get(az.module.root).span,
                })
                .collect();
            let param_tys: Vec<tarnc_core::Param> = export
                .params
                .iter()
                .map(|(name, texpr)| tarnc_core::Param {
                    name: name.clone(),
                    ty: resolve_type_expr(az, global, texpr, az.module.root),
                    span: az.module.ast.get(az.module.root).span,
                })
                .collect();

            let fty = az.module.types.function(return_type, param_tys, export.attrs);
            let span = az.module.ast.get(az.module.root).span;
            let node = az.module.ast.insert(
                NodeKind::Function {
                    name: export.name.clone(),
                    params,
                    return_type: TypeExpr::Named(Rc::from("")),
                    attrs: export.attrs,
                    body: None,
                },
                span,
            );
            az.module.ast.set_type(node, fty);

            az.module.scopes.define(
                global,
                Symbol {
                    name: export.name.clone(),
                    kind: SymbolKind::Function { node, linkage: Linkage::Imported },
                },
            );
            az.module.imported_members.push((import.name.clone(), export.name.clone()));
        }
    }
}

/// Rewrites a `module.member` access into a direct reference to that export and resolves it, or
/// reports an error if `module_name` was never imported or doesn't export `member`.
pub fn resolve_module_member(
    az: &mut Analyzer,
    node: NodeId,
    module_name: &Rc<str>,
    member: &Rc<str>,
    scope: ScopeId,
) -> tarnc_core::TypeId {
    let is_export = az
        .module
        .imported_members
        .iter()
        .any(|(m, e)| m.as_ref() == module_name.as_ref() && e.as_ref() == member.as_ref());

    if !is_export {
        az.error(node, format!("module `{module_name}` has no export `{member}`"));
        return super::check_expr::finish(az, node, az.module.types.void());
    }

    az.module.ast.replace_node(node, NodeKind::FunctionReference { name: member.clone(), resolved: None });
    check_expression(az, node, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::build_module;
    use crate::frontend::diagnostics::{CollectingSink, DiagnosticSink};

    struct FixedResolver;

    impl ImportResolver for FixedResolver {
        fn resolve(&self, import_name: &str) -> Vec<ExportedFunction> {
            if import_name == "math" {
                vec![ExportedFunction {
                    name: Rc::from("add"),
                    return_type: TypeExpr::Named(Rc::from("integer")),
                    params: vec![
                        (Rc::from("a"), TypeExpr::Named(Rc::from("integer"))),
                        (Rc::from("b"), TypeExpr::Named(Rc::from("integer"))),
                    ],
                    attrs: FunctionAttrs::empty(),
                }]
            } else {
                Vec::new()
            }
        }
    }

    fn check_with_resolver(source: &str) -> (crate::frontend::module::Module, CollectingSink) {
        let mut module = build_module("test.tarn", source.to_string()).expect("lex/parse");
        let mut sink = CollectingSink::new();
        Analyzer::new(&mut module, &mut sink).check_module_with_imports(&FixedResolver);
        (module, sink)
    }

    #[test]
    fn resolved_export_installs_a_callable_function_symbol() {
        let (_module, sink) = check_with_resolver("import math; main : integer() { return math.add(1, 2); }");
        assert!(!sink.had_errors(), "{:?}", sink.diagnostics);
    }

    #[test]
    fn unknown_export_on_a_real_import_is_an_error() {
        let (_module, sink) = check_with_resolver("import math; main : integer() { return math.subtract(1, 2); }");
        assert!(sink.had_errors());
        assert!(sink.diagnostics.iter().any(|d| d.message.contains("no export")));
    }

    #[test]
    fn null_resolver_leaves_every_import_without_exports() {
        let mut module = build_module("test.tarn", "import math;".to_string()).expect("lex/parse");
        let mut sink = CollectingSink::new();
        Analyzer::new(&mut module, &mut sink).check_module();
        assert!(!sink.had_errors());
        assert!(module.imported_members.is_empty());
    }
}
