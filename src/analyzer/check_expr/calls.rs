//! `Call` checking: intrinsic dispatch, then ordinary direct/indirect-function call checking.
//!
//! Overload resolution (triggered by checking the callee, if it's a name reference) already
//! validated arity and argument convertibility for its chosen candidate and reported any failure
//! diagnostic; this module's own arity/type checks only fire for calls through an un-overloaded
//! function-pointer value, where nothing else has looked at the arguments yet.

use std::rc::Rc;

use tarnc_core::{Intrinsic, Type, TypeId};
use tarnc_syntax::{NodeId, NodeKind, ScopeId};

use super::super::Analyzer;
use super::{check_expression, finish};

pub fn check_call(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    if az.module.ast.get(node).type_checked {
        return az.module.ast.get(node).ty.unwrap();
    }
    let (callee, args) = match az.module.ast.get(node).kind.clone() {
        NodeKind::Call { callee, args } => (callee, args),
        _ => unreachable!(),
    };

    if let Some(name) = callee_name(az, callee) {
        if let Some(intrinsic) = Intrinsic::from_name(&name) {
            return super::super::intrinsics::check_intrinsic_call(az, node, intrinsic, args, scope);
        }
    }

    let callee_ty = check_expression(az, callee, scope);
    // Overload resolution already reported a diagnostic for an unresolved callee; don't pile on.
    let already_reported = matches!(az.module.ast.get(callee).kind, NodeKind::FunctionReference { resolved: None, .. });

    let canon = az.module.types.canonicalize(callee_ty);
    let (fn_ty, via_pointer) = match az.module.types.get(canon) {
        Type::Function(_) => (Some(canon), false),
        Type::Pointer(inner) => {
            let inner = az.module.types.canonicalize(*inner);
            match az.module.types.get(inner) {
                Type::Function(_) => (Some(inner), true),
                _ => (None, false),
            }
        }
        _ => (None, false),
    };

    let fn_ty = match fn_ty {
        Some(t) => t,
        None => {
            if !already_reported {
                az.error(callee, format!("cannot call a value of type {}", az.describe_type(callee_ty)));
            }
            for &arg in &args {
                check_expression(az, arg, scope);
            }
            return finish(az, node, az.module.types.void());
        }
    };

    if via_pointer {
        az.module.ast.insert_implicit_deref(callee, fn_ty);
    }

    let (ret, param_tys): (TypeId, Vec<TypeId>) = match az.module.types.get(fn_ty) {
        Type::Function(f) => (f.return_type, f.params.iter().map(|p| p.ty).collect()),
        _ => unreachable!(),
    };

    if !already_reported && param_tys.len() != args.len() {
        az.error(node, format!("expected {} argument(s), found {}", param_tys.len(), args.len()));
    }

    for (i, &arg) in args.iter().enumerate() {
        let arg_ty = check_expression(az, arg, scope);
        if let Some(&pty) = param_tys.get(i) {
            match az.module.types.score(arg_ty, pty) {
                -1 => {
                    if !already_reported {
                        let message =
                            format!("argument {i} has type {}, expected {}", az.describe_type(arg_ty), az.describe_type(pty));
                        az.error(arg, message);
                    }
                }
                1 => {
                    az.module.ast.insert_implicit_cast(arg, pty);
                }
                _ => {}
            }
        }
    }

    finish(az, node, ret)
}

fn callee_name(az: &Analyzer, callee: NodeId) -> Option<Rc<str>> {
    match &az.module.ast.get(callee).kind {
        NodeKind::VariableReference { name, .. } | NodeKind::FunctionReference { name, .. } => Some(name.clone()),
        _ => None,
    }
}
