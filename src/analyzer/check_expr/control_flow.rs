//! Statement-sequence, function-body, and control-flow-node checking.

use tarnc_core::{FunctionAttrs, Type, TypeId};
use tarnc_syntax::{BinaryOp, Literal, NodeId, NodeKind, ScopeId, Symbol, SymbolKind};

use super::super::Analyzer;
use super::{check_expression, finish};

/// Shared by `Root` and `Block`: every non-terminal child that is a bare `==` comparison or a
/// direct call to a non-`discardable`, non-`void` function is a mistake worth flagging (spec
/// §4.2's "Root / Block" contract; §8's `x == y` scenario treats this as a hard error, not just a
/// warning, so the statement's own analysis is considered to have failed).
fn check_statement_contract(az: &mut Analyzer, child: NodeId) {
    if let NodeKind::Binary { op: BinaryOp::Eq, .. } = az.module.ast.get(child).kind {
        az.error(child, "comparison result unused; did you mean `:=`?");
    }
    if let NodeKind::Call { callee, .. } = az.module.ast.get(child).kind.clone() {
        if let Some(callee_ty) = az.module.ast.get(callee).ty {
            let canon = az.module.types.canonicalize(callee_ty);
            if let Type::Function(f) = az.module.types.get(canon).clone() {
                let void = az.module.types.void();
                let returns_void = az.module.types.equals(f.return_type, void);
                if !returns_void && !f.attrs.contains(FunctionAttrs::DISCARDABLE) {
                    az.error(child, "return value must be used, or the function must be declared `discardable`");
                }
            }
        }
    }
}

pub fn check_root(az: &mut Analyzer, node: NodeId, children: &[NodeId], scope: ScopeId) -> TypeId {
    let count = children.len();
    for (i, &child) in children.iter().enumerate() {
        if let NodeKind::ModuleReference { .. } = az.module.ast.get(child).kind {
            // Fully consumed during collection; nothing left to type-check.
            let void = az.module.types.void();
            finish(az, child, void);
        } else {
            check_expression(az, child, scope);
        }
        if i + 1 != count {
            check_statement_contract(az, child);
        }
    }
    root_post_pass(az, node, children);
    let void = az.module.types.void();
    finish(az, node, void)
}

/// Ensures the module's last top-level child ends up with an integer type usable as an exit
/// value: an implicit cast if it's already convertible, otherwise a synthesized trailing `0`.
/// This rewrite is scoped to `Root` only — `Block`s have no such "trailing value" convention.
fn root_post_pass(az: &mut Analyzer, root: NodeId, children: &[NodeId]) {
    let integer = az.module.types.integer();

    let last = match children.last() {
        Some(&l) => l,
        None => {
            append_zero(az, root, integer);
            return;
        }
    };

    let last_ty = az.module.ast.get(last).ty.unwrap_or(integer);
    if az.module.types.score(last_ty, integer) != -1 {
        az.module.ast.insert_implicit_cast(last, integer);
    } else {
        append_zero(az, root, integer);
    }
}

fn append_zero(az: &mut Analyzer, root: NodeId, integer: TypeId) {
    let span = az.module.ast.get(root).span;
    let lit = az.module.ast.insert(NodeKind::Literal(Literal::Number(0)), span);
    az.module.ast.set_parent(lit, root);
    finish(az, lit, integer);
    if let NodeKind::Root { children } = &mut az.module.ast.get_mut(root).kind {
        children.push(lit);
    }
}

pub fn check_block(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    let children = match az.module.ast.get(node).kind.clone() {
        NodeKind::Block { children } => children,
        _ => unreachable!(),
    };
    let inner = az.module.scopes.push_child(scope);
    let count = children.len();
    for (i, &child) in children.iter().enumerate() {
        check_expression(az, child, inner);
        if i + 1 != count {
            check_statement_contract(az, child);
        }
    }
    let void = az.module.types.void();
    finish(az, node, void)
}

pub fn check_function(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let body = match az.module.ast.get(node).kind.clone() {
        NodeKind::Function { body, .. } => body,
        _ => unreachable!(),
    };
    let fty = az.module.ast.get(node).ty.expect("function signature must be collected before its body is checked");
    let (return_type, attrs, params) = match az.module.types.get(fty).clone() {
        Type::Function(f) => (f.return_type, f.attrs, f.params),
        _ => unreachable!(),
    };

    if attrs.contains(FunctionAttrs::DISCARDABLE) {
        let void = az.module.types.void();
        if az.module.types.equals(return_type, void) {
            az.warning(node, "`discardable` has no effect on a function returning `void`");
        }
    }

    // Each `return` inside the body validates its own value against `return_type` (see
    // `check_return`); the block's own synthesized type is always `void` and carries no
    // information about what the function returns, so it is not compared here.
    if let Some(body) = body {
        let inner = az.module.scopes.push_child(scope);
        for p in &params {
            az.module.scopes.define(inner, Symbol { name: p.name.clone(), kind: SymbolKind::Variable { ty: p.ty } });
        }
        check_expression(az, body, inner);
    }

    finish(az, node, fty)
}

pub fn check_if(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (cond, then_branch, else_branch) = match az.module.ast.get(node).kind.clone() {
        NodeKind::If { cond, then_branch, else_branch } => (cond, then_branch, else_branch),
        _ => unreachable!(),
    };
    check_expression(az, cond, scope);
    let then_ty = check_expression(az, then_branch, scope);
    let ty = match else_branch {
        Some(e) => {
            let else_ty = check_expression(az, e, scope);
            match az.module.types.common_type(then_ty, else_ty) {
                Some(c) => c,
                None => az.module.types.void(),
            }
        }
        None => az.module.types.void(),
    };
    finish(az, node, ty)
}

pub fn check_while(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (cond, body) = match az.module.ast.get(node).kind.clone() {
        NodeKind::While { cond, body } => (cond, body),
        _ => unreachable!(),
    };
    check_expression(az, cond, scope);
    check_expression(az, body, scope);
    let void = az.module.types.void();
    finish(az, node, void)
}

pub fn check_for(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (cond, body) = match az.module.ast.get(node).kind.clone() {
        NodeKind::For { cond, body } => (cond, body),
        _ => unreachable!(),
    };
    let cond_ty = check_expression(az, cond, scope);
    let integer = az.module.types.integer();
    if !az.module.types.convertible(cond_ty, integer) {
        az.error(cond, format!("`for` condition must be convertible to an integer, found {}", az.describe_type(cond_ty)));
    }
    check_expression(az, body, scope);
    let void = az.module.types.void();
    finish(az, node, void)
}

pub fn check_return(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let value = match az.module.ast.get(node).kind.clone() {
        NodeKind::Return { value } => value,
        _ => unreachable!(),
    };

    let return_type = match az.module.ast.enclosing_function(node) {
        Some(f) => {
            let fty = az.module.ast.get(f).ty.expect("function signature must be collected");
            match az.module.types.get(fty) {
                Type::Function(ft) => ft.return_type,
                _ => az.module.types.void(),
            }
        }
        None => {
            az.error(node, "`return` outside of a function");
            az.module.types.void()
        }
    };
    let is_void_return = az.module.types.equals(return_type, az.module.types.void());

    match value {
        Some(v) => {
            let vty = check_expression(az, v, scope);
            if is_void_return {
                az.error(v, "cannot return a value from a function declared to return `void`");
            } else {
                match az.module.types.score(vty, return_type) {
                    -1 => {
                        let message = format!(
                            "return value of type {} is not convertible to declared return type {}",
                            az.describe_type(vty),
                            az.describe_type(return_type)
                        );
                        az.error(v, message);
                    }
                    1 => {
                        az.module.ast.insert_implicit_cast(v, return_type);
                    }
                    _ => {}
                }
            }
        }
        None => {
            if !is_void_return {
                let message = format!("missing return value; function declares return type {}", az.describe_type(return_type));
                az.error(node, message);
            }
        }
    }

    let void = az.module.types.void();
    finish(az, node, void)
}
