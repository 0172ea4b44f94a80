//! Literals, declarations, and the unified variable/function name-reference checker.

use tarnc_core::{Primitive, Type, TypeId};
use tarnc_syntax::{Literal, NodeId, NodeKind, ScopeId, Symbol, SymbolKind};

use super::super::collect::resolve_type_expr;
use super::super::overload;
use super::super::Analyzer;
use super::{check_expression, finish};

pub fn check_literal(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let lit = match &az.module.ast.get(node).kind {
        NodeKind::Literal(l) => l.clone(),
        _ => unreachable!(),
    };
    let ty = match lit {
        Literal::Number(_) => az.module.types.integer_literal(),
        Literal::String(s) => {
            let byte = az.module.types.byte();
            az.module.types.array(byte, s.len() as u64 + 1)
        }
        Literal::CompoundArray(_) => check_compound_array(az, node, scope, None),
    };
    finish(az, node, ty)
}

/// Type-check an initializer expression, propagating `declared`'s element type into a compound
/// array literal directly (spec §4.1's special case) rather than inferring a common type from
/// its elements.
pub(crate) fn check_initializer(az: &mut Analyzer, node: NodeId, scope: ScopeId, declared: Option<TypeId>) -> TypeId {
    let is_compound = matches!(az.module.ast.get(node).kind, NodeKind::Literal(Literal::CompoundArray(_)));
    if !is_compound {
        return check_expression(az, node, scope);
    }
    let element_hint = declared.and_then(|d| match az.module.types.get(az.module.types.canonicalize(d)) {
        Type::Array { element, .. } => Some(*element),
        _ => None,
    });
    check_compound_array(az, node, scope, element_hint)
}

fn check_compound_array(az: &mut Analyzer, node: NodeId, scope: ScopeId, hint: Option<TypeId>) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let elements = match &az.module.ast.get(node).kind {
        NodeKind::Literal(Literal::CompoundArray(elements)) => elements.clone(),
        _ => unreachable!(),
    };
    for &e in &elements {
        check_expression(az, e, scope);
    }

    let element_ty = match hint {
        Some(h) => {
            for &e in &elements {
                let ety = az.module.ast.get(e).ty.unwrap();
                match az.module.types.score(ety, h) {
                    -1 => az.error(e, format!("element of type {} is not convertible to {}", az.describe_type(ety), az.describe_type(h))),
                    1 => {
                        az.module.ast.insert_implicit_cast(e, h);
                    }
                    _ => {}
                }
            }
            h
        }
        None => {
            let mut common = match elements.first() {
                Some(&e) => az.module.ast.get(e).ty.unwrap(),
                None => az.module.types.void(),
            };
            for &e in elements.iter().skip(1) {
                let ety = az.module.ast.get(e).ty.unwrap();
                match az.module.types.common_type(common, ety) {
                    Some(c) => common = c,
                    None => {
                        az.error(e, format!("array element of type {} has no common type with preceding elements", az.describe_type(ety)));
                    }
                }
            }
            common
        }
    };

    let len = elements.len() as u64;
    let arr_ty = az.module.types.array(element_ty, len);
    finish(az, node, arr_ty)
}

pub fn check_declaration(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (name, type_expr, init) = match az.module.ast.get(node).kind.clone() {
        NodeKind::Declaration { name, type_expr, init } => (name, type_expr, init),
        _ => unreachable!(),
    };

    let declared = type_expr.as_ref().map(|t| resolve_type_expr(az, scope, t, node));

    let final_ty = match init {
        Some(init_node) => {
            let init_ty = check_initializer(az, init_node, scope, declared);
            match declared {
                Some(d) => {
                    match az.module.types.score(init_ty, d) {
                        -1 => {
                            let message = format!(
                                "cannot initialize `{}` of type {} with a value of type {}",
                                name,
                                az.describe_type(d),
                                az.describe_type(init_ty)
                            );
                            az.error(init_node, message);
                        }
                        1 => {
                            az.module.ast.insert_implicit_cast(init_node, d);
                        }
                        _ => {}
                    }
                    d
                }
                None => {
                    let integer_literal = az.module.types.integer_literal();
                    if az.module.types.equals(init_ty, integer_literal) {
                        let integer = az.module.types.integer();
                        az.module.ast.set_type(init_node, integer);
                        integer
                    } else {
                        init_ty
                    }
                }
            }
        }
        None => match declared {
            Some(d) => d,
            None => {
                az.error(node, format!("`{name}` needs either a declared type or an initializer"));
                az.module.types.void()
            }
        },
    };

    if !az.module.types.is_complete(final_ty) {
        let message = format!("cannot declare `{}` with incomplete type {}", name, az.describe_type(final_ty));
        az.error(node, message);
    }
    if matches!(az.module.types.get(az.module.types.canonicalize(final_ty)), Type::Function(_)) {
        az.error(node, format!("`{name}` cannot be declared with a bare function type; use a pointer"));
    }

    az.module.scopes.define(
        scope,
        Symbol {
            name,
            kind: SymbolKind::Variable { ty: final_ty },
        },
    );
    finish(az, node, final_ty)
}

/// The disambiguating entry point for both `VariableReference` and `FunctionReference` nodes:
/// the parser never knows which one a bare name is (it has no scope information), so every name
/// is parsed as a `VariableReference` and rewritten here the first time lookup turns up a
/// function symbol (spec §4.2/§4.3).
pub fn check_name_reference(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let name = match &az.module.ast.get(node).kind {
        NodeKind::VariableReference { name, .. } | NodeKind::FunctionReference { name, .. } => name.clone(),
        _ => unreachable!(),
    };

    let symbols = az.module.scopes.lookup(scope, &name);
    let is_function = symbols.iter().any(|s| matches!(s.kind, SymbolKind::Function { .. }));
    let first_kind = symbols.first().map(|s| s.kind.clone());

    if is_function {
        if !matches!(az.module.ast.get(node).kind, NodeKind::FunctionReference { .. }) {
            az.module.ast.replace_node(node, NodeKind::FunctionReference { name: name.clone(), resolved: None });
        }
        return overload::resolve_function_reference(az, node, scope);
    }

    match first_kind {
        Some(SymbolKind::Variable { ty }) => finish(az, node, ty),
        Some(SymbolKind::Type { .. }) | Some(SymbolKind::Structure { .. }) => {
            az.error(node, format!("`{name}` is a type, not a value"));
            finish(az, node, az.module.types.void())
        }
        Some(SymbolKind::Function { .. }) => unreachable!("handled by the is_function branch above"),
        None => {
            az.error(node, format!("unknown symbol `{name}`"));
            finish(az, node, az.module.types.void())
        }
    }
}

/// Used by the root/block post-pass to tell whether a discarded statement expression's type is
/// a primitive integer/byte width, which is the shape the "comparison used as a statement"
/// heuristic warns about.
pub(crate) fn is_integerish(types: &tarnc_core::TypeArena, ty: TypeId) -> bool {
    matches!(
        types.get(types.canonicalize(ty)),
        Type::Primitive(Primitive::Integer) | Type::Primitive(Primitive::Byte) | Type::Primitive(Primitive::IntegerLiteral) | Type::Integer { .. }
    )
}
