//! Declaration collection: the analyzer's first pass.
//!
//! Walks the module's top-level children before any body or expression is checked, so that
//! sibling function overloads and struct types are visible to every checker regardless of
//! declaration order (spec §4.3 step 1 assumes the whole overload set is already in scope by the
//! time a reference to it is resolved). Three inner passes, in order:
//!
//! 1. Struct shells: an empty struct type plus a `Structure` symbol for every declaration, so
//!    member types that reference other (possibly later-declared, possibly self-referential)
//!    structs resolve.
//! 2. Struct members: now that every struct name resolves, fill in and lay out each struct's
//!    member list.
//! 3. Function signatures: resolve each function's parameter/return types and install a
//!    `Function` symbol — possibly several per name, which is exactly how overloading accumulates
//!    in `ScopeTree::define`.
//!
//! Top-level `Declaration`s (module-scope variables) are deliberately left for the checking pass:
//! unlike functions and structs, initializers need full expression checking, and the source
//! language does not require forward visibility for them.

use std::rc::Rc;

use tarnc_core::{FunctionAttrs, Param, StructMember, TypeId};
use tarnc_syntax::{Linkage, NodeId, NodeKind, ScopeId, Symbol, SymbolKind, TypeExpr};

use super::Analyzer;

pub fn collect(az: &mut Analyzer) {
    let children = match &az.module.ast.get(az.module.root).kind {
        NodeKind::Root { children } => children.clone(),
        _ => unreachable!("module root must be a Root node"),
    };
    let global = az.module.scopes.global();

    collect_module_references(az, &children, global);
    collect_struct_shells(az, &children, global);
    collect_struct_members(az, &children, global);
    collect_function_signatures(az, &children, global);
}

fn collect_module_references(az: &mut Analyzer, children: &[NodeId], _global: ScopeId) {
    for &child in children {
        if let NodeKind::ModuleReference { name } = &az.module.ast.get(child).kind {
            az.module.imports.push(crate::frontend::module::Import { name: name.clone() });
        }
    }
}

fn collect_struct_shells(az: &mut Analyzer, children: &[NodeId], global: ScopeId) {
    for &child in children {
        if let NodeKind::StructDeclaration { name, .. } = az.module.ast.get(child).kind.clone() {
            let ty = az.module.types.new_struct(name.clone());
            az.module.ast.set_type(child, ty);
            az.module.scopes.define(
                global,
                Symbol {
                    name,
                    kind: SymbolKind::Structure { node: child, ty },
                },
            );
        }
    }
}

fn collect_struct_members(az: &mut Analyzer, children: &[NodeId], global: ScopeId) {
    for &child in children {
        let (ty, members) = match az.module.ast.get(child).kind.clone() {
            NodeKind::StructDeclaration { members, .. } => {
                let ty = az.module.ast.get(child).ty.expect("struct shell was set in the prior pass");
                (ty, members)
            }
            _ => continue,
        };
        let resolved: Vec<StructMember> = members
            .iter()
            .map(|m| StructMember {
                name: m.name.clone(),
                ty: resolve_type_expr(az, global, &m.type_expr, child),
                offset: None,
            })
            .collect();
        az.module.types.set_struct_members(ty, resolved);
        if let Err(e) = az.module.types.check_type(ty) {
            az.error(child, e.to_string());
        }
    }
}

fn collect_function_signatures(az: &mut Analyzer, children: &[NodeId], global: ScopeId) {
    for &child in children {
        let (name, params, return_type, attrs) = match az.module.ast.get(child).kind.clone() {
            NodeKind::Function {
                name,
                params,
                return_type,
                attrs,
                ..
            } => (name, params, return_type, attrs),
            _ => continue,
        };

        if let Err(e) = attrs.validate() {
            az.error(child, e.to_string());
        }

        let ret = resolve_type_expr(az, global, &return_type, child);
        let param_tys: Vec<Param> = params
            .iter()
            .map(|p| Param {
                name: p.name.clone(),
                ty: resolve_type_expr(az, global, &p.type_expr, child),
                span: p.span,
            })
            .collect();

        let fty = az.module.types.function(ret, param_tys, attrs);
        az.module.ast.set_type(child, fty);
        az.module.scopes.define(
            global,
            Symbol {
                name,
                kind: SymbolKind::Function {
                    node: child,
                    linkage: Linkage::Local,
                },
            },
        );
    }
}

/// Resolve a parsed [`TypeExpr`] into a [`TypeId`] by walking `scope`'s chain for named types.
/// Used both here (top-level signatures) and by the expression checker (local declarations,
/// casts) — hence `pub(crate)` rather than private.
pub(crate) fn resolve_type_expr(az: &mut Analyzer, scope: ScopeId, texpr: &TypeExpr, at: NodeId) -> TypeId {
    match texpr {
        TypeExpr::Named(name) => resolve_named_type(az, scope, name, at),
        TypeExpr::Pointer(inner) => {
            let t = resolve_type_expr(az, scope, inner, at);
            az.module.types.pointer(t)
        }
        TypeExpr::Reference(inner) => {
            let t = resolve_type_expr(az, scope, inner, at);
            az.module.types.reference(t)
        }
        TypeExpr::Array(inner, len) => {
            let t = resolve_type_expr(az, scope, inner, at);
            az.module.types.array(t, *len)
        }
        TypeExpr::Function { return_type, params } => {
            let ret = resolve_type_expr(az, scope, return_type, at);
            let param_tys: Vec<TypeId> = params.iter().map(|p| resolve_type_expr(az, scope, p, at)).collect();
            let params = param_tys
                .into_iter()
                .map(|ty| Param {
                    name: Rc::from(""),
                    ty,
                    span: az.module.ast.get(at).span,
                })
                .collect();
            az.module.types.function(ret, params, FunctionAttrs::empty())
        }
    }
}

fn resolve_named_type(az: &mut Analyzer, scope: ScopeId, name: &Rc<str>, at: NodeId) -> TypeId {
    match name.as_ref() {
        "void" => return az.module.types.void(),
        "byte" => return az.module.types.byte(),
        "integer" => return az.module.types.integer(),
        _ => {}
    }
    let symbols = az.module.scopes.lookup(scope, name);
    for sym in symbols {
        match &sym.kind {
            SymbolKind::Type { target } => return *target,
            SymbolKind::Structure { ty, .. } => return *ty,
            _ => {}
        }
    }
    az.error(at, format!("unknown type `{name}`"));
    az.module.types.named(name.clone())
}
