//! The expression/statement checker: the analyzer's second pass.
//!
//! [`check_expression`] is the single recursive entry point every node-shape-specific checker
//! calls back into for its children, dispatching on [`NodeKind`] and threading the same
//! [`ScopeId`] its own caller was given (see the module docs one level up for why there is no
//! node-to-scope side table). It is idempotent: a node whose `type_checked` flag is already set
//! returns its cached type immediately, which is what lets the overload resolver and the
//! intrinsic/import rewrites call back into a node that may already have been visited.

mod access;
mod basics;
mod calls;
mod control_flow;
mod ops;

use tarnc_core::TypeId;
use tarnc_syntax::{NodeId, NodeKind, ScopeId};

use super::Analyzer;

pub fn check_expression(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }

    match az.module.ast.get(node).kind.clone() {
        NodeKind::Root { children } => control_flow::check_root(az, node, &children, scope),
        NodeKind::Block { .. } => control_flow::check_block(az, node, scope),
        NodeKind::Function { .. } => control_flow::check_function(az, node, scope),
        NodeKind::If { .. } => control_flow::check_if(az, node, scope),
        NodeKind::While { .. } => control_flow::check_while(az, node, scope),
        NodeKind::For { .. } => control_flow::check_for(az, node, scope),
        NodeKind::Return { .. } => control_flow::check_return(az, node, scope),

        NodeKind::Declaration { .. } => basics::check_declaration(az, node, scope),
        NodeKind::Literal(_) => basics::check_literal(az, node, scope),
        NodeKind::VariableReference { .. } | NodeKind::FunctionReference { .. } => {
            basics::check_name_reference(az, node, scope)
        }

        NodeKind::Call { .. } => calls::check_call(az, node, scope),
        // Already lowered by an earlier visit (e.g. the overload resolver's dependent-argument
        // path resolves an intrinsic call's argument before `check_expression` reaches it).
        NodeKind::IntrinsicCall { .. } => {
            let ty = az.module.ast.get(node).ty.unwrap_or_else(|| az.module.types.void());
            finish(az, node, ty)
        }

        NodeKind::Cast { .. } => ops::check_cast(az, node, scope),
        NodeKind::Binary { .. } => ops::check_binary(az, node, scope),
        NodeKind::Unary { .. } => ops::check_unary(az, node, scope),

        NodeKind::MemberAccess { .. } => access::check_member_access(az, node, scope),
        NodeKind::ModuleReference { name } => {
            az.error(node, format!("`{name}` names an imported module, not a value"));
            finish(az, node, az.module.types.void())
        }

        // Fully handled during collection; nothing left to check here.
        NodeKind::StructDeclaration { .. } => {
            let ty = az.module.ast.get(node).ty.unwrap();
            finish(az, node, ty)
        }
    }
}

/// Cache `ty` on `node` and mark it checked; the shared tail of every leaf checker.
pub(crate) fn finish(az: &mut Analyzer, node: NodeId, ty: TypeId) -> TypeId {
    az.module.ast.set_type(node, ty);
    az.module.ast.get_mut(node).type_checked = true;
    ty
}

/// An expression denotes storage — assignment targets and address-of operands are checked
/// against this (spec §4.2's l-value set: variable references, subscripts, dereferences, and
/// member access on an l-value).
pub(crate) fn is_lvalue(az: &Analyzer, node: NodeId) -> bool {
    match &az.module.ast.get(node).kind {
        NodeKind::VariableReference { .. } => true,
        NodeKind::Binary { op, .. } if *op == tarnc_syntax::BinaryOp::Subscript => true,
        NodeKind::Unary { op, .. } if *op == tarnc_syntax::UnaryOp::Deref => true,
        NodeKind::MemberAccess { lhs, .. } => is_lvalue(az, *lhs),
        _ => false,
    }
}
