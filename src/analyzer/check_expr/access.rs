//! `MemberAccess` checking: struct member lookup, and the module-reference rewrite (spec §4.2 —
//! `module.name` parses as member access on a `ModuleReference` LHS, since the parser has no
//! import table to consult, and gets rewritten into a direct reference here).

use std::rc::Rc;

use tarnc_core::{Type, TypeId};
use tarnc_syntax::{NodeId, NodeKind, ScopeId};

use super::super::Analyzer;
use super::{check_expression, finish};

/// Like `Variable-reference` vs. `Function-reference`, the parser has no import table and always
/// emits a bare `math` as a `VariableReference` — it cannot tell a module name from a variable
/// name. Rewrite it to a `ModuleReference` here, the one place that distinction actually matters,
/// the first time it appears as a member access's LHS and matches a real import.
fn module_reference_name(az: &mut Analyzer, lhs: NodeId) -> Option<Rc<str>> {
    match az.module.ast.get(lhs).kind.clone() {
        NodeKind::ModuleReference { name } => Some(name),
        NodeKind::VariableReference { name, .. } if az.module.imports.iter().any(|i| i.name == name) => {
            az.module.ast.replace_node(lhs, NodeKind::ModuleReference { name: name.clone() });
            Some(name)
        }
        _ => None,
    }
}

pub fn check_member_access(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (lhs, member) = match az.module.ast.get(node).kind.clone() {
        NodeKind::MemberAccess { lhs, member, .. } => (lhs, member),
        _ => unreachable!(),
    };

    if let Some(module_name) = module_reference_name(az, lhs) {
        return super::super::imports::resolve_module_member(az, node, &module_name, &member, scope);
    }

    let lhs_ty = check_expression(az, lhs, scope);
    let canon = az.module.types.strip_references(az.module.types.canonicalize(lhs_ty));
    let struct_ty = match az.module.types.get(canon) {
        Type::Struct(_) => Some(canon),
        _ => None,
    };
    let struct_ty = match struct_ty {
        Some(s) => s,
        None => {
            az.error(lhs, format!("cannot access member `{member}` of non-struct type {}", az.describe_type(lhs_ty)));
            return finish(az, node, az.module.types.void());
        }
    };

    let found = match az.module.types.get(struct_ty) {
        Type::Struct(s) => s.members.iter().position(|m| m.name.as_ref() == member.as_ref()).map(|i| (i, s.members[i].ty)),
        _ => unreachable!(),
    };
    let (index, member_ty) = match found {
        Some(hit) => hit,
        None => {
            az.error(node, format!("struct has no member `{member}`"));
            return finish(az, node, az.module.types.void());
        }
    };

    if let NodeKind::MemberAccess { member_index, .. } = &mut az.module.ast.get_mut(node).kind {
        *member_index = Some(index);
    }
    finish(az, node, member_ty)
}
