//! Name-based function overload resolution (spec §4.3) — the centerpiece algorithm.
//!
//! An unresolved `FunctionReference` `F` is resolved against the overload set its name reaches
//! through `F`'s scope chain, pruned by arity, argument convertibility and syntactic context
//! (callee, declaration target, assignment target, cast target, address-of). When one of the
//! arguments is *itself* an unresolved function reference, callee and argument overload sets
//! prune each other (step 2e) before either commits to a single candidate.
//!
//! Candidates never disappear from `O` — an invalidated candidate stays in the list with a
//! reason attached, because a failed resolution's diagnostic has to list every overload and why
//! it lost.

use tarnc_core::{Type, TypeId};
use tarnc_syntax::{NodeId, NodeKind, ScopeId, Symbol, SymbolKind, TypeExpr, UnaryOp};

use super::collect::resolve_type_expr;
use super::Analyzer;

/// Why a candidate was ruled out. Carries enough detail that the final diagnostic can point at
/// the exact mismatch rather than just saying "no match" (spec §4.3 step 4, §9 "dynamic overload
/// set container").
#[derive(Debug, Clone)]
pub enum Invalid {
    ParameterCount,
    ArgumentType { index: usize, expected: TypeId, found: TypeId },
    NoDependentArg { index: usize },
    NoDependentCallee,
    TooManyConversions,
    ExpectedTypeMismatch,
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub node: NodeId,
    pub ty: TypeId,
    pub score: i64,
    pub invalid: Option<Invalid>,
}

impl Candidate {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }
}

/// Step 1: every function symbol named `name` reachable from `scope`, plus the shared-return-type
/// check. Reused both for `F` itself and for a dependent argument's own overload set `Oᵢ`.
pub fn collect_overload_set(az: &mut Analyzer, scope: ScopeId, name: &str, at: NodeId) -> Vec<Candidate> {
    let symbols: Vec<Symbol> = az.module.scopes.lookup(scope, name).to_vec();
    let mut candidates = Vec::new();
    let mut first_return: Option<TypeId> = None;

    for sym in &symbols {
        let node = match &sym.kind {
            SymbolKind::Function { node, .. } => *node,
            _ => continue,
        };
        let ty = az
            .module
            .ast
            .get(node)
            .ty
            .expect("function signature must be collected before any reference is checked");
        let return_type = match az.module.types.get(ty) {
            Type::Function(f) => Some(f.return_type),
            _ => None,
        };
        if let Some(rt) = return_type {
            match first_return {
                None => first_return = Some(rt),
                Some(prev) if !az.module.types.equals(prev, rt) => {
                    az.error(node, "overloaded declarations of this name do not share a return type");
                }
                _ => {}
            }
        }
        candidates.push(Candidate {
            node,
            ty,
            score: 0,
            invalid: None,
        });
    }

    if candidates.is_empty() {
        az.error(at, format!("unknown symbol `{name}`"));
    }
    candidates
}

/// Entry point: resolve the `FunctionReference` node `node`, driven by its syntactic context.
pub fn resolve_function_reference(az: &mut Analyzer, node: NodeId, scope: ScopeId) -> TypeId {
    let name = match &az.module.ast.get(node).kind {
        NodeKind::FunctionReference { name, .. } => name.clone(),
        other => unreachable!("resolve_function_reference called on {other:?}"),
    };

    let mut candidates = collect_overload_set(az, scope, &name, node);
    if candidates.is_empty() {
        let ty = az.module.types.void();
        finish_unresolved(az, node, ty);
        return ty;
    }

    let parent = az.module.ast.get(node).parent;
    match parent.map(|p| az.module.ast.get(p).kind.clone()) {
        Some(NodeKind::Call { callee, args }) if callee == node => {
            if let Some(ty) = resolve_as_callee(az, node, scope, &mut candidates, &args, &name) {
                return ty;
            }
        }
        Some(NodeKind::Unary { op: UnaryOp::AddressOf, operand }) if operand == node => {
            return resolve_address_of(az, node, scope, parent.unwrap(), candidates, &name);
        }
        other => {
            apply_context_pruning(az, scope, &mut candidates, other.as_ref(), node);
        }
    }

    finish_resolution(az, node, &name, candidates)
}

/// Step 2: `F` is the callee of a call with arguments `args`. Returns `Some` when the dependent-
/// argument path (2e) already drove `F` to resolution, so the caller must not resolve it again.
fn resolve_as_callee(
    az: &mut Analyzer,
    node: NodeId,
    scope: ScopeId,
    candidates: &mut Vec<Candidate>,
    args: &[NodeId],
    name: &str,
) -> Option<TypeId> {
    // 2a: check every argument that isn't itself an unresolved function reference.
    let mut dependent: Vec<usize> = Vec::new();
    for (i, &arg) in args.iter().enumerate() {
        if is_unresolved_function_reference(az, arg) {
            dependent.push(i);
        } else {
            super::check_expr::check_expression(az, arg, scope);
        }
    }

    // 2b: arity.
    for c in candidates.iter_mut() {
        let arity = match az.module.types.get(c.ty) {
            Type::Function(f) => f.params.len(),
            _ => 0,
        };
        if arity != args.len() {
            c.invalid = Some(Invalid::ParameterCount);
        }
    }

    // 2c: score every already-typed argument against each surviving candidate.
    for c in candidates.iter_mut() {
        if !c.is_valid() {
            continue;
        }
        let param_tys: Vec<TypeId> = match az.module.types.get(c.ty) {
            Type::Function(f) => f.params.iter().map(|p| p.ty).collect(),
            _ => Vec::new(),
        };
        let mut total = 0i64;
        for (i, &arg) in args.iter().enumerate() {
            if dependent.contains(&i) {
                continue;
            }
            let arg_ty = az.module.ast.get(arg).ty.expect("checked above");
            let s = az.module.types.score(arg_ty, param_tys[i]);
            if s < 0 {
                c.invalid = Some(Invalid::ArgumentType {
                    index: i,
                    expected: param_tys[i],
                    found: arg_ty,
                });
                break;
            }
            total += s as i64;
        }
        if c.is_valid() {
            c.score = total;
        }
    }

    if dependent.is_empty() {
        reduce_to_minimum_score(candidates);
        return None;
    }

    // 2e: bidirectional inference between F's overload set and each dependent argument's.
    let mut dependent_sets: Vec<(usize, Vec<Candidate>)> = Vec::new();
    for &i in &dependent {
        let arg_name = match &az.module.ast.get(args[i]).kind {
            NodeKind::FunctionReference { name, .. } => name.clone(),
            _ => unreachable!(),
        };
        let set = collect_overload_set(az, scope, &arg_name, args[i]);
        dependent_sets.push((i, set));
    }

    for c in candidates.iter_mut() {
        if !c.is_valid() {
            continue;
        }
        let param_tys: Vec<TypeId> = match az.module.types.get(c.ty) {
            Type::Function(f) => f.params.iter().map(|p| p.ty).collect(),
            _ => Vec::new(),
        };
        for &(i, ref set) in &dependent_sets {
            let has_match = set
                .iter()
                .filter(|o| o.is_valid())
                .any(|o| az.module.types.score(o.ty, param_tys[i]) == 0);
            if !has_match {
                c.invalid = Some(Invalid::NoDependentArg { index: i });
                break;
            }
        }
    }

    reduce_to_minimum_score(candidates);
    let resolved_ty = finish_resolution(az, node, name, std::mem::take(candidates));
    // finish_resolution already wrote F's type/resolved slot; re-derive its params for pruning Oᵢ.
    let param_tys: Vec<TypeId> = match az.module.types.get(resolved_ty) {
        Type::Function(f) => f.params.clone().into_iter().map(|p| p.ty).collect(),
        _ => Vec::new(),
    };

    for (i, mut set) in dependent_sets {
        for o in set.iter_mut() {
            if !o.is_valid() {
                continue;
            }
            if az.module.types.score(o.ty, param_tys[i]) != 0 {
                o.invalid = Some(Invalid::NoDependentCallee);
            }
        }
        let arg_name = match &az.module.ast.get(args[i]).kind {
            NodeKind::FunctionReference { name, .. } => name.clone(),
            _ => unreachable!(),
        };
        finish_resolution(az, args[i], &arg_name, set);
    }
    Some(resolved_ty)
}

fn is_unresolved_function_reference(az: &Analyzer, node: NodeId) -> bool {
    matches!(
        az.module.ast.get(node).kind,
        NodeKind::FunctionReference { resolved: None, .. }
    ) && !az.module.ast.get(node).type_checked
}

fn reduce_to_minimum_score(candidates: &mut [Candidate]) {
    let min = candidates.iter().filter(|c| c.is_valid()).map(|c| c.score).min();
    if let Some(min) = min {
        for c in candidates.iter_mut() {
            if c.is_valid() && c.score != min {
                c.invalid = Some(Invalid::TooManyConversions);
            }
        }
    }
}

/// Step 3's address-of case: `&F` is spliced away once `F` resolves, so the tree ends up with a
/// plain resolved reference in the unary's old slot rather than `&`-wrapping it (functions and
/// pointers-to-functions already compare equivalent, spec §4.1 rule 4).
fn resolve_address_of(
    az: &mut Analyzer,
    node: NodeId,
    scope: ScopeId,
    unary_node: NodeId,
    mut candidates: Vec<Candidate>,
    name: &str,
) -> TypeId {
    let grandparent = az
        .module
        .ast
        .get(unary_node)
        .parent
        .map(|p| az.module.ast.get(p).kind.clone());
    apply_context_pruning(az, scope, &mut candidates, grandparent.as_ref(), unary_node);
    let resolved_ty = finish_resolution(az, node, name, candidates);
    let resolved_kind = az.module.ast.get(node).kind.clone();
    az.module.ast.replace_node(unary_node, resolved_kind);
    az.module.ast.set_type(unary_node, resolved_ty);
    az.module.ast.get_mut(unary_node).type_checked = true;
    resolved_ty
}

/// Step 3's non-callee pruning rules, shared by the plain and address-of-spliced paths.
/// `identity` is the node standing in for `F` for the purposes of "is this the LHS or RHS".
fn apply_context_pruning(
    az: &mut Analyzer,
    scope: ScopeId,
    candidates: &mut Vec<Candidate>,
    parent_kind: Option<&NodeKind>,
    identity: NodeId,
) {
    match parent_kind {
        Some(NodeKind::Declaration { type_expr: Some(texpr), .. }) => {
            prune_to_expected_function_type(az, scope, candidates, texpr, identity);
        }
        Some(NodeKind::Binary { op, lhs, rhs }) if op.is_assignment() => {
            if *rhs == identity {
                let lhs_ty = az.module.ast.get(*lhs).ty;
                match lhs_ty {
                    Some(ty) => prune_to_equivalent(az, candidates, ty),
                    None => {} // LHS not yet checked; nothing to prune against.
                }
            } else {
                az.error(identity, "cannot assign to a function");
            }
        }
        Some(NodeKind::Cast { target, .. }) => {
            prune_to_expected_function_type(az, scope, candidates, target, identity);
        }
        _ => {}
    }
}

fn prune_to_expected_function_type(
    az: &mut Analyzer,
    scope: ScopeId,
    candidates: &mut Vec<Candidate>,
    texpr: &TypeExpr,
    at: NodeId,
) {
    let expected = resolve_type_expr(az, scope, texpr, at);
    let pointee = match az.module.types.get(expected) {
        Type::Pointer(p) => Some(*p),
        Type::Function(_) => Some(expected),
        _ => None,
    };
    match pointee {
        Some(target) => prune_to_equivalent(az, candidates, target),
        None => az.error(at, "a function reference here requires a function or pointer-to-function type"),
    }
}

fn prune_to_equivalent(az: &mut Analyzer, candidates: &mut [Candidate], target: TypeId) {
    for c in candidates.iter_mut() {
        if c.is_valid() && az.module.types.score(c.ty, target) != 0 {
            c.invalid = Some(Invalid::ExpectedTypeMismatch);
        }
    }
}

/// Step 4: commit to a single candidate, or report why none was reachable.
fn finish_resolution(az: &mut Analyzer, node: NodeId, name: &str, candidates: Vec<Candidate>) -> TypeId {
    let valid: Vec<&Candidate> = candidates.iter().filter(|c| c.is_valid()).collect();
    match valid.len() {
        1 => {
            let chosen = valid[0];
            let ty = chosen.ty;
            let target = chosen.node;
            match az.module.ast.get_mut(node).kind {
                NodeKind::FunctionReference { ref mut resolved, .. } => *resolved = Some(target),
                _ => {}
            }
            finish_unresolved(az, node, ty);
            ty
        }
        0 => {
            let message = describe_overload_failure(az, name, &candidates);
            az.error(node, message);
            let ty = az.module.types.void();
            finish_unresolved(az, node, ty);
            ty
        }
        _ => {
            az.error(node, format!("ambiguous overload for `{name}`: {} candidates tied", valid.len()));
            let ty = valid[0].ty;
            finish_unresolved(az, node, ty);
            ty
        }
    }
}

fn finish_unresolved(az: &mut Analyzer, node: NodeId, ty: TypeId) {
    az.module.ast.set_type(node, ty);
    az.module.ast.get_mut(node).type_checked = true;
}

fn describe_overload_failure(az: &Analyzer, name: &str, candidates: &[Candidate]) -> String {
    let mut msg = format!("no matching overload for `{name}`\nOverloads:");
    for c in candidates {
        let reason = match &c.invalid {
            Some(Invalid::ParameterCount) => " (parameter count mismatch)".to_string(),
            Some(Invalid::ArgumentType { index, expected, found }) => format!(
                " (argument {index}: expected {}, found {})",
                az.describe_type(*expected),
                az.describe_type(*found)
            ),
            Some(Invalid::NoDependentArg { index }) => format!(" (no overload for argument {index} matches)"),
            Some(Invalid::NoDependentCallee) => " (does not match the resolved callee)".to_string(),
            Some(Invalid::TooManyConversions) => " (requires more conversions than the best match)".to_string(),
            Some(Invalid::ExpectedTypeMismatch) => " (does not match the expected type)".to_string(),
            None => " (valid)".to_string(),
        };
        msg.push_str(&format!("\n  {}{}", az.describe_type(c.ty), reason));
    }
    msg
}
