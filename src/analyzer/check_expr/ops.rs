//! Casts, binary operators (arithmetic, comparison, subscript, assignment) and unary operators.

use tarnc_core::{Primitive, Type, TypeId};
use tarnc_syntax::{BinaryOp, Literal, NodeId, NodeKind, ScopeId, UnaryOp};

use super::super::collect::resolve_type_expr;
use super::super::Analyzer;
use super::{check_expression, finish, is_lvalue};

pub fn check_cast(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (target_expr, expr) = match az.module.ast.get(node).kind.clone() {
        NodeKind::Cast { target, expr } => (target, expr),
        _ => unreachable!(),
    };
    let target = resolve_type_expr(az, scope, &target_expr, node);
    let source_ty = check_expression(az, expr, scope);

    if !az.module.types.is_complete(target) {
        az.error(node, format!("cannot cast to incomplete type {}", az.describe_type(target)));
        return finish(az, node, target);
    }

    let canon_src = az.module.types.canonicalize(source_ty);
    let canon_tgt = az.module.types.canonicalize(target);
    let src_is_ptr = matches!(az.module.types.get(canon_src), Type::Pointer(_));
    let tgt_is_ptr = matches!(az.module.types.get(canon_tgt), Type::Pointer(_));
    let src_is_int = is_integer_shape(az.module.types.get(canon_src));
    let tgt_is_int = is_integer_shape(az.module.types.get(canon_tgt));
    let tgt_is_ref = matches!(az.module.types.get(canon_tgt), Type::Reference(_));
    let is_zero_literal = matches!(&az.module.ast.get(expr).kind, NodeKind::Literal(Literal::Number(0)));

    if tgt_is_ref && !is_lvalue(az, expr) {
        az.error(node, "cannot cast an r-value to a reference type");
    } else if src_is_int && tgt_is_ptr && !is_zero_literal {
        az.error(node, "cannot cast an integer to a pointer (reserved)");
    } else {
        let ok = az.module.types.convertible(source_ty, target)
            || (src_is_ptr && tgt_is_ptr)
            || (src_is_ptr && tgt_is_int)
            || (src_is_int && tgt_is_int)
            || (is_zero_literal && tgt_is_ptr)
            || same_size_reinterpret(az, canon_src, canon_tgt);
        if !ok {
            az.error(
                node,
                format!("cannot cast {} to {}", az.describe_type(source_ty), az.describe_type(target)),
            );
        }
    }

    finish(az, node, target)
}

fn is_integer_shape(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Integer { .. } | Type::Primitive(Primitive::Byte) | Type::Primitive(Primitive::Integer) | Type::Primitive(Primitive::IntegerLiteral)
    )
}

fn same_size_reinterpret(az: &mut Analyzer, a: TypeId, b: TypeId) -> bool {
    let (Some(sa), Some(sb)) = (az.module.types.size_of(a), az.module.types.size_of(b)) else {
        return false;
    };
    if sa != sb || sa == 0 {
        return false;
    }
    let (Some(aa), Some(ab)) = (az.module.types.align_of(a), az.module.types.align_of(b)) else {
        return false;
    };
    let (larger, smaller) = if aa >= ab { (aa, ab) } else { (ab, aa) };
    smaller != 0 && larger % smaller == 0
}

pub fn check_binary(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (op, lhs, rhs) = match az.module.ast.get(node).kind.clone() {
        NodeKind::Binary { op, lhs, rhs } => (op, lhs, rhs),
        _ => unreachable!(),
    };

    if op == BinaryOp::Subscript {
        return check_subscript(az, node, lhs, rhs, scope);
    }
    if op.is_assignment() {
        return check_assignment(az, node, lhs, rhs, scope);
    }

    let lhs_ty = check_expression(az, lhs, scope);
    let rhs_ty = check_expression(az, rhs, scope);

    if op.is_comparison() {
        if az.module.types.common_type(lhs_ty, rhs_ty).is_none() {
            az.error(
                node,
                format!("cannot compare {} and {}", az.describe_type(lhs_ty), az.describe_type(rhs_ty)),
            );
        }
        let integer = az.module.types.integer();
        return finish(az, node, integer);
    }

    // Arithmetic and bitwise operators need a captured literal-operand fact before any cast
    // insertion rewrites the operand nodes out from under it.
    let rhs_is_literal_zero = matches!(&az.module.ast.get(rhs).kind, NodeKind::Literal(Literal::Number(0)));
    let rhs_literal_value = match &az.module.ast.get(rhs).kind {
        NodeKind::Literal(Literal::Number(n)) => Some(*n),
        _ => None,
    };

    let common = az.module.types.common_type(lhs_ty, rhs_ty);
    let result_ty = match common {
        Some(c) => {
            if az.module.types.score(lhs_ty, c) == 1 {
                az.module.ast.insert_implicit_cast(lhs, c);
            }
            if az.module.types.score(rhs_ty, c) == 1 {
                az.module.ast.insert_implicit_cast(rhs, c);
            }
            c
        }
        None => {
            az.error(
                node,
                format!("incompatible operand types {} and {}", az.describe_type(lhs_ty), az.describe_type(rhs_ty)),
            );
            lhs_ty
        }
    };

    if matches!(op, BinaryOp::Div | BinaryOp::Mod) && rhs_is_literal_zero {
        az.error(rhs, format!("{} by a constant zero", if op == BinaryOp::Div { "division" } else { "modulus" }));
    }
    if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
        if let Some(n) = rhs_literal_value {
            let bits = az.module.types.size_of(result_ty).unwrap_or(8) * 8;
            if n < 0 || n as u64 >= bits {
                az.error(rhs, format!("shift amount {n} is out of range for a {bits}-bit operand"));
            }
        }
    }

    finish(az, node, result_ty)
}

fn check_subscript(az: &mut Analyzer, node: NodeId, lhs: NodeId, rhs: NodeId, scope: ScopeId) -> TypeId {
    let lhs_ty = check_expression(az, lhs, scope);
    let rhs_ty = check_expression(az, rhs, scope);

    let stripped = az.module.types.strip_references(az.module.types.canonicalize(lhs_ty));
    let element = match az.module.types.get(stripped) {
        Type::Array { element, .. } => Some(*element),
        Type::Pointer(inner) => Some(*inner),
        _ => None,
    };
    let element = match element {
        Some(e) => e,
        None => {
            az.error(lhs, format!("cannot index a value of type {}", az.describe_type(lhs_ty)));
            return finish(az, node, az.module.types.void());
        }
    };

    // Capture the constant-index fact before a convertibility cast rewrites `rhs`.
    let literal_index = match &az.module.ast.get(rhs).kind {
        NodeKind::Literal(Literal::Number(n)) => Some(*n),
        _ => None,
    };
    if let (Type::Array { len, .. }, Some(n)) = (az.module.types.get(stripped).clone(), literal_index) {
        if n < 0 || n as u64 >= len {
            az.error(rhs, format!("index {n} out of bounds for array of length {len}"));
        }
    }

    let integer = az.module.types.integer();
    match az.module.types.score(rhs_ty, integer) {
        -1 => az.error(rhs, "subscript index must be an integer"),
        1 => {
            az.module.ast.insert_implicit_cast(rhs, integer);
        }
        _ => {}
    }

    let ptr = az.module.types.pointer(element);
    finish(az, node, ptr)
}

fn check_assignment(az: &mut Analyzer, node: NodeId, lhs: NodeId, rhs: NodeId, scope: ScopeId) -> TypeId {
    let lhs_ty = check_expression(az, lhs, scope);
    if !is_lvalue(az, lhs) {
        az.error(lhs, "assignment target must be an l-value");
    }
    if matches!(az.module.types.get(az.module.types.canonicalize(lhs_ty)), Type::Function(_)) {
        az.error(lhs, "cannot assign to a function");
    }

    let rhs_ty = check_expression(az, rhs, scope);
    match az.module.types.score(rhs_ty, lhs_ty) {
        -1 => {
            let message = format!("cannot assign a value of type {} to {}", az.describe_type(rhs_ty), az.describe_type(lhs_ty));
            az.error(rhs, message);
        }
        1 => {
            az.module.ast.insert_implicit_cast(rhs, lhs_ty);
        }
        _ => {}
    }

    let void = az.module.types.void();
    finish(az, node, void)
}

pub fn check_unary(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (op, operand) = match az.module.ast.get(node).kind.clone() {
        NodeKind::Unary { op, operand } => (op, operand),
        _ => unreachable!(),
    };

    match op {
        UnaryOp::AddressOf => {
            let operand_ty = check_expression(az, operand, scope);
            // If `operand` was an unresolved function reference, the overload resolver's
            // address-of splice (spec §4.3 step 3) has already replaced this whole node.
            if az.module.ast.get(node).type_checked {
                return az.module.ast.get(node).ty.unwrap();
            }
            if !is_lvalue(az, operand) {
                az.error(operand, "address-of requires an l-value");
            }
            let ptr = az.module.types.pointer(operand_ty);
            finish(az, node, ptr)
        }
        UnaryOp::Deref => {
            let operand_ty = check_expression(az, operand, scope);
            let canon = az.module.types.canonicalize(operand_ty);
            match az.module.types.get(canon).clone() {
                Type::Pointer(inner) => {
                    if !az.module.types.is_complete(inner) {
                        az.error(node, "cannot dereference a pointer to an incomplete type");
                    }
                    finish(az, node, inner)
                }
                _ => {
                    az.error(operand, format!("cannot dereference a value of type {}", az.describe_type(operand_ty)));
                    finish(az, node, az.module.types.void())
                }
            }
        }
        UnaryOp::BitNot => {
            let operand_ty = check_expression(az, operand, scope);
            let canon = az.module.types.canonicalize(operand_ty);
            if !is_integer_shape(az.module.types.get(canon)) {
                az.error(operand, "bitwise complement requires an integer operand");
            }
            finish(az, node, operand_ty)
        }
    }
}
