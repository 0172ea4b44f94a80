//! The arena-backed syntax tree produced by the parser and mutated in place by the semantic
//! analyzer.
//!
//! Nodes never move once inserted: every reference between them (parent links, callee/argument
//! edges, the overload resolver's `resolved` slot) is a [`NodeId`] index into the owning
//! [`Ast`]'s arena rather than a pointer or an owned child. That's what lets the analyzer rewrite
//! the tree — insert an implicit cast, replace a module-reference with a direct reference,
//! splice `&f` into its grandparent — without fighting the borrow checker or re-validating
//! parent pointers by hand.

use std::rc::Rc;

use tarnc_core::{Span, TypeId};

/// Index into an [`Ast`]'s node arena. Stable for the lifetime of the owning module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A type as written by the programmer, before names have been resolved against a scope. The
/// analyzer turns this into a [`TypeId`] the first time the declaration it annotates is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Named(Rc<str>),
    Pointer(Box<TypeExpr>),
    Reference(Box<TypeExpr>),
    Array(Box<TypeExpr>, u64),
    Function {
        return_type: Box<TypeExpr>,
        params: Vec<TypeExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `a[i]`.
    Subscript,
    /// `:=`.
    Assign,
    /// `::`, the source language's other assignment spelling.
    AssignAlt,
}

impl BinaryOp {
    pub fn is_assignment(self) -> bool {
        matches!(self, BinaryOp::Assign | BinaryOp::AssignAlt)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `@p`, pointer dereference.
    Deref,
    /// `&lvalue`, address-of.
    AddressOf,
    /// `~x`, bitwise complement.
    BitNot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// The raw decimal text as written; parsed to a value only once the literal's width/
    /// signedness is known (it starts life as `integer_literal`).
    Number(i128),
    String(Rc<str>),
    /// A `{ a, b, c }` compound literal; element expressions, not yet typed.
    CompoundArray(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub struct StructMemberDecl {
    pub name: Rc<str>,
    pub type_expr: TypeExpr,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: Rc<str>,
    pub type_expr: TypeExpr,
    pub span: Span,
}

/// The shape-specific payload of a node. See the module docs for why children are `NodeId`s
/// rather than owned nodes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root {
        children: Vec<NodeId>,
    },
    /// A bare `module_name` reference prior to resolution against the import list; a
    /// `Member-access` whose LHS is one of these gets rewritten by the analyzer (§4.2).
    ModuleReference {
        name: Rc<str>,
    },
    Function {
        name: Rc<str>,
        params: Vec<ParamDecl>,
        return_type: TypeExpr,
        attrs: tarnc_core::FunctionAttrs,
        body: Option<NodeId>,
    },
    Declaration {
        name: Rc<str>,
        type_expr: Option<TypeExpr>,
        init: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    For {
        cond: NodeId,
        body: NodeId,
    },
    Return {
        value: Option<NodeId>,
    },
    Block {
        children: Vec<NodeId>,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    IntrinsicCall {
        intrinsic: tarnc_core::Intrinsic,
        args: Vec<NodeId>,
    },
    Cast {
        target: TypeExpr,
        expr: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Literal(Literal),
    VariableReference {
        name: Rc<str>,
        resolved: Option<NodeId>,
    },
    FunctionReference {
        name: Rc<str>,
        resolved: Option<NodeId>,
    },
    MemberAccess {
        lhs: NodeId,
        member: Rc<str>,
        /// Cached index into the struct's member list, filled in once resolved.
        member_index: Option<usize>,
    },
    StructDeclaration {
        name: Rc<str>,
        members: Vec<StructMemberDecl>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub ty: Option<TypeId>,
    pub type_checked: bool,
}

/// The arena owning every node of one module's syntax tree.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Insert a freshly parsed (or synthesized) node with no parent yet; the caller links it in
    /// with [`Self::set_parent`] once its place in a parent's child list is known.
    pub fn insert(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            ty: None,
            type_checked: false,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
    }

    pub fn set_type(&mut self, id: NodeId, ty: TypeId) {
        self.nodes[id.index()].ty = Some(ty);
    }

    /// Walk `node`'s parent chain until a `Function` node is found. Used by `Return` checking
    /// to find the function whose declared return type a value must match.
    pub fn enclosing_function(&self, node: NodeId) -> Option<NodeId> {
        let mut cur = self.get(node).parent;
        while let Some(id) = cur {
            if matches!(self.get(id).kind, NodeKind::Function { .. }) {
                return Some(id);
            }
            cur = self.get(id).parent;
        }
        None
    }

    /// Replace `old`'s contents in place with `new_kind`, preserving `old`'s `NodeId` (so every
    /// existing reference to it keeps working), its parent link, and its position in the
    /// parent's child list. This is the single rewrite primitive the analyzer uses for implicit
    /// casts, module-reference-to-direct-reference rewrites, and overload substitution.
    pub fn replace_node(&mut self, old: NodeId, new_kind: NodeKind) {
        let node = &mut self.nodes[old.index()];
        node.kind = new_kind;
        node.type_checked = false;
        node.ty = None;
    }

    /// Wrap `target` in a new `Cast` node and splice the cast into `target`'s former place: the
    /// cast node takes over `target`'s old `NodeId` identity from the parent's point of view by
    /// moving `target`'s old contents into a freshly allocated node and turning `target`'s slot
    /// into the cast. Every existing reference to `target` (e.g. an argument slot in a `Call`)
    /// automatically now observes the cast instead, with no parent-list surgery required.
    pub fn insert_implicit_cast(&mut self, target: NodeId, to: TypeId) -> NodeId {
        let inner_kind = std::mem::replace(
            &mut self.nodes[target.index()].kind,
            NodeKind::Literal(Literal::Number(0)),
        );
        let span = self.nodes[target.index()].span;
        let parent = self.nodes[target.index()].parent;
        let old_ty = self.nodes[target.index()].ty;

        let inner_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind: inner_kind,
            span,
            parent: Some(target),
            ty: old_ty,
            type_checked: true,
        });

        let cast_node = &mut self.nodes[target.index()];
        cast_node.kind = NodeKind::Cast {
            target: TypeExpr::Named(Rc::from("<implicit>")),
            expr: inner_id,
        };
        cast_node.parent = parent;
        cast_node.ty = Some(to);
        cast_node.type_checked = true;
        target
    }

    /// Same splice as [`Self::insert_implicit_cast`], but wraps `target` in a `Unary { Deref }`
    /// instead of a `Cast` — used when a call's callee is a pointer-to-function value and needs
    /// an implicit dereference before codegen can treat it as a direct call.
    pub fn insert_implicit_deref(&mut self, target: NodeId, pointee: TypeId) -> NodeId {
        let inner_kind = std::mem::replace(
            &mut self.nodes[target.index()].kind,
            NodeKind::Literal(Literal::Number(0)),
        );
        let span = self.nodes[target.index()].span;
        let parent = self.nodes[target.index()].parent;
        let old_ty = self.nodes[target.index()].ty;

        let inner_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind: inner_kind,
            span,
            parent: Some(target),
            ty: old_ty,
            type_checked: true,
        });

        let deref_node = &mut self.nodes[target.index()];
        deref_node.kind = NodeKind::Unary {
            op: UnaryOp::Deref,
            operand: inner_id,
        };
        deref_node.parent = parent;
        deref_node.ty = Some(pointee);
        deref_node.type_checked = true;
        target
    }
}
