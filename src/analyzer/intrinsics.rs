//! Intrinsic call recognition and checking (spec §4.4).
//!
//! A `Call` whose callee is a bare name matching a reserved `__builtin_*` identifier never goes
//! through overload resolution — the callee has no declaration to resolve and codegen needs to
//! recognize the call shape directly, so [`check_intrinsic_call`] rewrites the `Call` node into an
//! `IntrinsicCall` in place once its own arity/type rules are satisfied.

use tarnc_core::{Intrinsic, Type, TypeId};
use tarnc_syntax::{Literal, NodeId, NodeKind, ScopeId};

use super::check_expr::check_expression;
use super::Analyzer;

pub fn check_intrinsic_call(az: &mut Analyzer, node: NodeId, intrinsic: Intrinsic, args: Vec<NodeId>, scope: ScopeId) -> TypeId {
    let ty = match intrinsic {
        Intrinsic::Syscall => check_syscall(az, node, &args, scope),
        Intrinsic::Inline => check_inline(az, node, &args, scope),
        Intrinsic::Line => check_line(az, node, &args),
        Intrinsic::Filename => check_filename(az, node, &args),
        Intrinsic::Debugtrap => check_debugtrap(az, node, &args),
        Intrinsic::Memcpy => check_memcpy(az, node, &args, scope),
    };

    // `check_line`/`check_filename` already replaced the node with a `Literal`; everything else
    // becomes an `IntrinsicCall`.
    if !matches!(az.module.ast.get(node).kind, NodeKind::Literal(_)) {
        az.module.ast.replace_node(node, NodeKind::IntrinsicCall { intrinsic, args });
    }
    az.module.ast.set_type(node, ty);
    az.module.ast.get_mut(node).type_checked = true;
    ty
}

fn check_syscall(az: &mut Analyzer, node: NodeId, args: &[NodeId], scope: ScopeId) -> TypeId {
    if args.is_empty() || args.len() > 7 {
        az.error(node, "__builtin_syscall takes 1 to 7 arguments");
    }
    let integer = az.module.types.integer();
    for &arg in args {
        let arg_ty = check_expression(az, arg, scope);
        if !az.module.types.is_complete(arg_ty) {
            az.error(arg, "syscall argument must be a complete, register-sized type");
            continue;
        }
        if az.module.types.score(arg_ty, integer) == 1 {
            az.module.ast.insert_implicit_cast(arg, integer);
        }
    }
    integer
}

fn check_inline(az: &mut Analyzer, node: NodeId, args: &[NodeId], scope: ScopeId) -> TypeId {
    if args.len() != 1 {
        az.error(node, "__builtin_inline takes exactly one argument");
        return az.module.types.void();
    }
    let arg = args[0];
    if !matches!(az.module.ast.get(arg).kind, NodeKind::Call { .. }) {
        az.error(arg, "__builtin_inline's argument must be a call expression");
    }
    check_expression(az, arg, scope)
}

fn check_line(az: &mut Analyzer, node: NodeId, args: &[NodeId]) -> TypeId {
    if !args.is_empty() {
        az.error(node, "__builtin_line takes no arguments");
    }
    let line = line_number_at(&az.module.source, az.module.ast.get(node).span.start as usize);
    az.module.ast.replace_node(node, NodeKind::Literal(Literal::Number(line as i128)));
    az.module.types.integer_literal()
}

fn check_filename(az: &mut Analyzer, node: NodeId, args: &[NodeId]) -> TypeId {
    if !args.is_empty() {
        az.error(node, "__builtin_filename takes no arguments");
    }
    let basename: std::rc::Rc<str> = az
        .module
        .filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(&az.module.filename)
        .into();
    let len = basename.len() as u64;
    az.module.ast.replace_node(node, NodeKind::Literal(Literal::String(basename)));
    let byte = az.module.types.byte();
    az.module.types.array(byte, len + 1)
}

fn check_debugtrap(az: &mut Analyzer, node: NodeId, args: &[NodeId]) -> TypeId {
    if !args.is_empty() {
        az.error(node, "__builtin_debugtrap takes no arguments");
    }
    az.module.types.void()
}

fn check_memcpy(az: &mut Analyzer, node: NodeId, args: &[NodeId], scope: ScopeId) -> TypeId {
    if args.len() != 3 {
        az.error(node, "__builtin_memcpy takes exactly 3 arguments (dst, src, n)");
        return az.module.types.void();
    }
    let dst_ty = check_expression(az, args[0], scope);
    let src_ty = check_expression(az, args[1], scope);
    let n_ty = check_expression(az, args[2], scope);

    if !matches!(az.module.types.get(az.module.types.canonicalize(dst_ty)), Type::Pointer(_)) {
        az.error(args[0], "__builtin_memcpy's first argument must be a pointer");
    }
    if !matches!(az.module.types.get(az.module.types.canonicalize(src_ty)), Type::Pointer(_)) {
        az.error(args[1], "__builtin_memcpy's second argument must be a pointer");
    }
    let integer = az.module.types.integer();
    match az.module.types.score(n_ty, integer) {
        -1 => az.error(args[2], "__builtin_memcpy's third argument must be convertible to an integer"),
        1 => {
            az.module.ast.insert_implicit_cast(args[2], integer);
        }
        _ => {}
    }
    az.module.types.void()
}

fn line_number_at(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    1 + source[..offset].matches('\n').count()
}
