//! The `Type` arena: canonicalization, structural equality, convertibility scoring and the
//! struct layout engine.
//!
//! Every `Type` lives in a `TypeArena` and is addressed by a small [`TypeId`] handle rather than
//! by reference, so that cyclic type graphs (`T = @T`) and in-place mutation (lazily computing a
//! struct's layout) don't fight the borrow checker. The arena itself never touches a diagnostics
//! sink: every fallible operation here returns a `Result` that the analyzer turns into a
//! diagnostic with source-location context the arena doesn't have.

use std::rc::Rc;

use crate::attrs::FunctionAttrs;
use crate::span::Span;

/// Handle to a `Type` stored in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The four built-in, non-composite primitives. `Byte` and `Integer` are shorthand for
/// `u8`/`i64` respectively; `IntegerLiteral` is the untyped sentinel assigned to number
/// literals before they're promoted to a concrete integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Void,
    Byte,
    Integer,
    IntegerLiteral,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Rc<str>,
    pub ty: TypeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionType {
    pub return_type: TypeId,
    pub params: Vec<Param>,
    pub attrs: FunctionAttrs,
}

#[derive(Debug, Clone)]
pub struct StructMember {
    pub name: Rc<str>,
    pub ty: TypeId,
    /// Filled in by [`TypeArena::compute_struct_layout`]; `None` until then.
    pub offset: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct StructType {
    pub name: Rc<str>,
    pub members: Vec<StructMember>,
    pub size: Option<u64>,
    pub align: Option<u64>,
    /// Set once every member's type has been checked and offsets assigned.
    pub members_checked: bool,
}

#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: Rc<str>,
    /// `None` means the alias hasn't been resolved yet (or never will be — an unknown type
    /// name). An unresolved `Named` is, by definition, incomplete.
    pub target: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub enum Type {
    Primitive(Primitive),
    /// An arbitrary-width integer, 1..=64 bits.
    Integer { bits: u16, signed: bool },
    Pointer(TypeId),
    Reference(TypeId),
    Array { element: TypeId, len: u64 },
    Function(FunctionType),
    Struct(StructType),
    Named(NamedType),
}

struct TypeData {
    ty: Type,
    checked: bool,
}

/// Errors raised by [`TypeArena::check_type`]. All are domain violations on the type's own
/// shape; incompleteness by itself is not an error here (see [`TypeArena::is_complete`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    ZeroSizeArray,
    ZeroWidthInteger,
    /// Integer width exceeds the 64-bit ceiling. Carries the offending width.
    IntegerTooWide(u16),
    /// Function parameter at this index names an incomplete type.
    IncompleteFunctionParam(usize),
    /// A struct member or array element could not be sized while computing layout.
    IncompleteMember,
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::ZeroSizeArray => write!(f, "array length must be greater than zero"),
            LayoutError::ZeroWidthInteger => write!(f, "integer type must be at least 1 bit wide"),
            LayoutError::IntegerTooWide(bits) => {
                write!(f, "sorry, unimplemented: {bits}-bit integers (maximum is 64)")
            }
            LayoutError::IncompleteFunctionParam(i) => {
                write!(f, "parameter {i} has incomplete type")
            }
            LayoutError::IncompleteMember => write!(f, "member has incomplete type"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// `-1`, `0` or `1` as described by the convertibility table: not convertible, equivalent (no
/// conversion needed), or convertible via an inserted implicit conversion.
pub type ConvertError = i8;

fn align_up(offset: u64, align: u64) -> u64 {
    if align == 0 {
        return offset;
    }
    (offset + align - 1) / align * align
}

pub struct TypeArena {
    types: Vec<TypeData>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    /// Fixed slots for the four primitives, always present at these indices.
    const VOID: TypeId = TypeId(0);
    const BYTE: TypeId = TypeId(1);
    const INTEGER: TypeId = TypeId(2);
    const INTEGER_LITERAL: TypeId = TypeId(3);

    pub fn new() -> Self {
        let mut arena = Self { types: Vec::new() };
        arena.push(Type::Primitive(Primitive::Void));
        arena.push(Type::Primitive(Primitive::Byte));
        arena.push(Type::Primitive(Primitive::Integer));
        arena.push(Type::Primitive(Primitive::IntegerLiteral));
        arena
    }

    pub fn void(&self) -> TypeId {
        Self::VOID
    }
    pub fn byte(&self) -> TypeId {
        Self::BYTE
    }
    /// The canonical 64-bit signed integer type.
    pub fn integer(&self) -> TypeId {
        Self::INTEGER
    }
    pub fn integer_literal(&self) -> TypeId {
        Self::INTEGER_LITERAL
    }

    fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeData { ty, checked: false });
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()].ty
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        self.push(Type::Pointer(pointee))
    }

    pub fn reference(&mut self, referent: TypeId) -> TypeId {
        self.push(Type::Reference(referent))
    }

    pub fn array(&mut self, element: TypeId, len: u64) -> TypeId {
        self.push(Type::Array { element, len })
    }

    pub fn integer_of_width(&mut self, bits: u16, signed: bool) -> TypeId {
        self.push(Type::Integer { bits, signed })
    }

    pub fn function(&mut self, return_type: TypeId, params: Vec<Param>, attrs: FunctionAttrs) -> TypeId {
        self.push(Type::Function(FunctionType {
            return_type,
            params,
            attrs,
        }))
    }

    /// Create an as-yet-unresolved named alias (e.g. a forward reference to a type name
    /// being looked up in scope).
    pub fn named(&mut self, name: Rc<str>) -> TypeId {
        self.push(Type::Named(NamedType { name, target: None }))
    }

    pub fn resolve_named(&mut self, id: TypeId, target: TypeId) {
        if let Type::Named(n) = &mut self.types[id.index()].ty {
            n.target = Some(target);
        }
    }

    /// Create an empty struct shell; call [`Self::set_struct_members`] once the member list
    /// is known, then [`Self::check_type`] to lay it out.
    pub fn new_struct(&mut self, name: Rc<str>) -> TypeId {
        self.push(Type::Struct(StructType {
            name,
            members: Vec::new(),
            size: None,
            align: None,
            members_checked: false,
        }))
    }

    pub fn set_struct_members(&mut self, id: TypeId, members: Vec<StructMember>) {
        if let Type::Struct(s) = &mut self.types[id.index()].ty {
            s.members = members;
        }
    }

    /// Strip `Named` aliases until a non-alias (or an unresolved alias) is reached.
    pub fn canonicalize(&self, id: TypeId) -> TypeId {
        let mut cur = id;
        loop {
            match self.get(cur) {
                Type::Named(n) => match n.target {
                    Some(t) => cur = t,
                    None => return cur,
                },
                _ => return cur,
            }
        }
    }

    /// Walk through `Reference` wrappers.
    pub fn strip_references(&self, id: TypeId) -> TypeId {
        let mut cur = id;
        while let Type::Reference(inner) = self.get(cur) {
            cur = *inner;
        }
        cur
    }

    fn int_byte_size(&self, id: TypeId) -> Option<(u64, bool)> {
        match self.get(id) {
            Type::Primitive(Primitive::Byte) => Some((1, false)),
            Type::Primitive(Primitive::Integer) => Some((8, true)),
            Type::Integer { bits, signed } => Some((((*bits as u64) + 7) / 8, *signed)),
            _ => None,
        }
    }

    /// Structural equality on canonical forms. Function equals function iff return types equal
    /// and parameter type lists equal (names ignored); array equals array iff element equal and
    /// sizes equal; primitive equals primitive by identity; two unresolved named types are equal
    /// iff their names match.
    pub fn equals(&self, a: TypeId, b: TypeId) -> bool {
        let a = self.canonicalize(a);
        let b = self.canonicalize(b);
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (Type::Primitive(p1), Type::Primitive(p2)) => p1 == p2,
            (Type::Integer { bits: b1, signed: s1 }, Type::Integer { bits: b2, signed: s2 }) => {
                b1 == b2 && s1 == s2
            }
            (Type::Pointer(x), Type::Pointer(y)) => self.equals(*x, *y),
            (Type::Reference(x), Type::Reference(y)) => self.equals(*x, *y),
            (Type::Array { element: e1, len: l1 }, Type::Array { element: e2, len: l2 }) => {
                l1 == l2 && self.equals(*e1, *e2)
            }
            (Type::Function(f1), Type::Function(f2)) => {
                self.equals(f1.return_type, f2.return_type)
                    && f1.params.len() == f2.params.len()
                    && f1.params.iter().zip(&f2.params).all(|(p1, p2)| self.equals(p1.ty, p2.ty))
            }
            (Type::Named(n1), Type::Named(n2)) => n1.target.is_none() && n2.target.is_none() && n1.name == n2.name,
            // Struct types are nominal: two distinct declarations are never equal even if
            // structurally identical, and canonicalization already collapsed aliases of the
            // *same* declaration to the same TypeId (caught by `a == b` above).
            _ => false,
        }
    }

    /// An incomplete type's layout cannot yet be computed: an unresolved named type, or a
    /// struct/array/function containing one. A pointer to an incomplete type is itself
    /// complete (the pointer has a fixed size regardless of what it points to).
    pub fn is_complete(&self, id: TypeId) -> bool {
        match self.get(id) {
            Type::Primitive(_) | Type::Integer { .. } | Type::Pointer(_) => true,
            Type::Reference(inner) => self.is_complete(*inner),
            Type::Array { element, .. } => self.is_complete(*element),
            Type::Function(f) => self.is_complete(f.return_type) && f.params.iter().all(|p| self.is_complete(p.ty)),
            Type::Struct(s) => s.members_checked,
            Type::Named(n) => match n.target {
                Some(t) => self.is_complete(t),
                None => false,
            },
        }
    }

    /// Layout and completeness pass. Idempotent via the `checked` flag, which also serves as a
    /// re-entry fence for cyclic type graphs reached through a pointer (`T = @T`): the second
    /// entry short-circuits to `Ok(())` immediately, which means "already looked at", not
    /// "complete".
    pub fn check_type(&mut self, id: TypeId) -> Result<(), LayoutError> {
        if self.types[id.index()].checked {
            return Ok(());
        }
        self.types[id.index()].checked = true;

        match self.get(id).clone_shallow() {
            ShallowType::Primitive => {}
            ShallowType::Integer { bits } => {
                if bits == 0 {
                    return Err(LayoutError::ZeroWidthInteger);
                }
                if bits > 64 {
                    return Err(LayoutError::IntegerTooWide(bits));
                }
            }
            ShallowType::Pointer(inner) | ShallowType::Reference(inner) => {
                self.check_type(inner)?;
            }
            ShallowType::Array { element, len } => {
                if len == 0 {
                    return Err(LayoutError::ZeroSizeArray);
                }
                self.check_type(element)?;
            }
            ShallowType::Function { return_type, params } => {
                self.check_type(return_type)?;
                for (i, p) in params.iter().enumerate() {
                    self.check_type(*p)?;
                    if !self.is_complete(*p) {
                        return Err(LayoutError::IncompleteFunctionParam(i));
                    }
                }
            }
            ShallowType::Struct { members } => {
                for m in &members {
                    self.check_type(*m)?;
                }
                self.compute_struct_layout(id)?;
            }
            ShallowType::Named(target) => {
                if let Some(t) = target {
                    self.check_type(t)?;
                }
            }
        }
        Ok(())
    }

    /// Size in bytes for a complete type; `None` if incomplete or sizeless (a bare function
    /// type has no value representation — only `@function` does).
    pub fn size_of(&mut self, id: TypeId) -> Option<u64> {
        let id = self.canonicalize(id);
        match self.get(id).clone_shallow() {
            ShallowType::Primitive => match self.get(id) {
                Type::Primitive(Primitive::Void) => Some(0),
                Type::Primitive(Primitive::Byte) => Some(1),
                Type::Primitive(Primitive::Integer) | Type::Primitive(Primitive::IntegerLiteral) => Some(8),
                _ => unreachable!(),
            },
            ShallowType::Integer { bits } => Some(((bits as u64) + 7) / 8),
            ShallowType::Pointer(_) | ShallowType::Reference(_) => Some(8),
            ShallowType::Array { element, len } => self.size_of(element).map(|es| es * len),
            ShallowType::Function { .. } => None,
            ShallowType::Struct { .. } => {
                self.compute_struct_layout(id).ok()?;
                match self.get(id) {
                    Type::Struct(s) => s.size,
                    _ => None,
                }
            }
            ShallowType::Named(_) => None,
        }
    }

    pub fn align_of(&mut self, id: TypeId) -> Option<u64> {
        let id = self.canonicalize(id);
        match self.get(id).clone_shallow() {
            ShallowType::Primitive => match self.get(id) {
                Type::Primitive(Primitive::Void) => Some(1),
                Type::Primitive(Primitive::Byte) => Some(1),
                Type::Primitive(Primitive::Integer) | Type::Primitive(Primitive::IntegerLiteral) => Some(8),
                _ => unreachable!(),
            },
            ShallowType::Integer { bits } => {
                let bytes = ((bits as u64) + 7) / 8;
                Some(bytes.next_power_of_two().min(8).max(1))
            }
            ShallowType::Pointer(_) | ShallowType::Reference(_) => Some(8),
            ShallowType::Array { element, .. } => self.align_of(element),
            ShallowType::Function { .. } => None,
            ShallowType::Struct { .. } => {
                self.compute_struct_layout(id).ok()?;
                match self.get(id) {
                    Type::Struct(s) => s.align,
                    _ => None,
                }
            }
            ShallowType::Named(_) => None,
        }
    }

    /// A struct's byte size is the sum of its members, each aligned to its own type's
    /// alignment, with the running total rounded up to the struct's own alignment (the max
    /// member alignment, unless the struct pre-declares one). Each member's offset is the
    /// running aligned size just before that member.
    fn compute_struct_layout(&mut self, id: TypeId) -> Result<(), LayoutError> {
        let member_tys: Vec<TypeId> = match self.get(id) {
            Type::Struct(s) if s.size.is_some() => return Ok(()),
            Type::Struct(s) => s.members.iter().map(|m| m.ty).collect(),
            _ => return Ok(()),
        };

        let mut offset = 0u64;
        let mut max_align = 1u64;
        let mut offsets = Vec::with_capacity(member_tys.len());
        for mty in &member_tys {
            let malign = self.align_of(*mty).ok_or(LayoutError::IncompleteMember)?;
            let msize = self.size_of(*mty).ok_or(LayoutError::IncompleteMember)?;
            offset = align_up(offset, malign);
            offsets.push(offset);
            offset += msize;
            max_align = max_align.max(malign);
        }

        if let Type::Struct(s) = &mut self.types[id.index()].ty {
            let align = s.align.unwrap_or(max_align);
            for (m, off) in s.members.iter_mut().zip(offsets) {
                m.offset = Some(off);
            }
            s.size = Some(align_up(offset, align));
            s.align = Some(align);
            s.members_checked = true;
        }
        Ok(())
    }

    /// Convertibility score: `-1` not convertible, `0` equivalent (no conversion), `1` requires
    /// an inserted implicit conversion. Evaluated per the table in the design doc, top to
    /// bottom; the first matching rule wins.
    pub fn score(&self, from: TypeId, to: TypeId) -> ConvertError {
        // 1. Any type -> void.
        if matches!(self.get(to), Type::Primitive(Primitive::Void)) {
            return 0;
        }
        let cf = self.canonicalize(from);
        let ct = self.canonicalize(to);

        // 2. Both incomplete named-unresolved types: equal by name, else incompatible.
        if let (Type::Named(nf), Type::Named(nt)) = (self.get(cf), self.get(ct)) {
            if nf.target.is_none() && nt.target.is_none() {
                return if nf.name == nt.name { 0 } else { -1 };
            }
        }

        // 3. Canonical equality.
        if self.equals(cf, ct) {
            return 0;
        }

        // 4. Function <-> pointer-to-function of equal pointee (symmetric).
        if let (Type::Function(_), Type::Pointer(pointee)) = (self.get(cf), self.get(ct)) {
            let pointee = self.canonicalize(*pointee);
            if matches!(self.get(pointee), Type::Function(_)) && self.equals(cf, pointee) {
                return 0;
            }
        }
        if let (Type::Pointer(pointee), Type::Function(_)) = (self.get(cf), self.get(ct)) {
            let pointee = self.canonicalize(*pointee);
            if matches!(self.get(pointee), Type::Function(_)) && self.equals(pointee, ct) {
                return 0;
            }
        }

        // 5. Reference -> Reference: recurse on referents.
        if let (Type::Reference(rf), Type::Reference(rt)) = (self.get(cf), self.get(ct)) {
            return self.score(*rf, *rt);
        }
        // 6. Reference -> T: recurse with the l-value loaded.
        if let Type::Reference(rf) = self.get(cf) {
            return self.score(*rf, to);
        }
        // 7. T -> Reference: recurse with an l-value required (the expression checker is
        // responsible for rejecting r-values here; this is a pure type-shape query).
        if let Type::Reference(rt) = self.get(ct) {
            return self.score(from, *rt);
        }

        // 8. Integer -> Integer.
        if let (Some((fsize, fsigned)), Some((tsize, tsigned))) = (self.int_byte_size(cf), self.int_byte_size(ct)) {
            if fsize == tsize && fsigned == tsigned {
                return 0;
            }
            if tsize > fsize && (tsigned || !fsigned) {
                return 1;
            }
            return -1;
        }

        // 9. integer_literal -> any integer.
        if matches!(self.get(cf), Type::Primitive(Primitive::IntegerLiteral)) && self.int_byte_size(ct).is_some() {
            return 1;
        }

        // 10. Array -> Array: element convertible and from.len <= to.len.
        if let (Type::Array { element: ef, len: lf }, Type::Array { element: et, len: lt }) =
            (self.get(cf), self.get(ct))
        {
            let inner = self.score(*ef, *et);
            if inner != -1 && lf <= lt {
                return inner;
            }
            return -1;
        }

        // 11. Otherwise.
        -1
    }

    pub fn convertible(&self, from: TypeId, to: TypeId) -> bool {
        self.score(from, to) != -1
    }

    /// For integers, the larger of the two if the signedness relation in [`Self::score`]'s rule
    /// 8 holds in the stated direction; otherwise there is no common type.
    pub fn common_type(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if self.equals(a, b) {
            return Some(a);
        }
        if self.score(a, b) != -1 {
            return Some(b);
        }
        if self.score(b, a) != -1 {
            return Some(a);
        }
        None
    }
}

/// A cheap, `Copy`-ish view into a `Type` used internally by [`TypeArena::check_type`]/
/// `size_of`/`align_of` so those methods don't hold a borrow of `self.types` across a
/// recursive call that needs `&mut self`.
enum ShallowType {
    Primitive,
    Integer { bits: u16 },
    Pointer(TypeId),
    Reference(TypeId),
    Array { element: TypeId, len: u64 },
    Function { return_type: TypeId, params: Vec<TypeId> },
    Struct { members: Vec<TypeId> },
    Named(Option<TypeId>),
}

trait ShallowClone {
    fn clone_shallow(&self) -> ShallowType;
}

impl ShallowClone for Type {
    fn clone_shallow(&self) -> ShallowType {
        match self {
            Type::Primitive(_) => ShallowType::Primitive,
            Type::Integer { bits, .. } => ShallowType::Integer { bits: *bits },
            Type::Pointer(t) => ShallowType::Pointer(*t),
            Type::Reference(t) => ShallowType::Reference(*t),
            Type::Array { element, len } => ShallowType::Array {
                element: *element,
                len: *len,
            },
            Type::Function(f) => ShallowType::Function {
                return_type: f.return_type,
                params: f.params.iter().map(|p| p.ty).collect(),
            },
            Type::Struct(s) => ShallowType::Struct {
                members: s.members.iter().map(|m| m.ty).collect(),
            },
            Type::Named(n) => ShallowType::Named(n.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_layout_matches_spec_example() {
        let mut arena = TypeArena::new();
        let byte = arena.byte();
        let integer = arena.integer();
        let s = arena.new_struct(Rc::from("S"));
        arena.set_struct_members(
            s,
            vec![
                StructMember {
                    name: Rc::from("a"),
                    ty: byte,
                    offset: None,
                },
                StructMember {
                    name: Rc::from("b"),
                    ty: integer,
                    offset: None,
                },
            ],
        );
        arena.check_type(s).unwrap();
        match arena.get(s) {
            Type::Struct(st) => {
                assert_eq!(st.members[0].offset, Some(0));
                assert_eq!(st.members[1].offset, Some(8));
                assert_eq!(st.size, Some(16));
                assert_eq!(st.align, Some(8));
            }
            _ => panic!("expected struct"),
        }
    }

    #[test]
    fn zero_size_array_is_rejected() {
        let mut arena = TypeArena::new();
        let byte = arena.byte();
        let arr = arena.array(byte, 0);
        assert_eq!(arena.check_type(arr), Err(LayoutError::ZeroSizeArray));
    }

    #[test]
    fn integer_width_bounds() {
        let mut arena = TypeArena::new();
        let zero = arena.integer_of_width(0, true);
        assert_eq!(arena.check_type(zero), Err(LayoutError::ZeroWidthInteger));
        let too_wide = arena.integer_of_width(65, true);
        assert_eq!(arena.check_type(too_wide), Err(LayoutError::IntegerTooWide(65)));
        let ok = arena.integer_of_width(17, true);
        assert_eq!(arena.check_type(ok), Ok(()));
    }

    #[test]
    fn literal_converts_to_any_integer_with_score_one() {
        let arena = TypeArena::new();
        let lit = arena.integer_literal();
        let byte = arena.byte();
        let integer = arena.integer();
        assert_eq!(arena.score(lit, byte), 1);
        assert_eq!(arena.score(lit, integer), 1);
    }

    #[test]
    fn byte_to_integer_widens_but_not_back() {
        let arena = TypeArena::new();
        let byte = arena.byte();
        let integer = arena.integer();
        assert_eq!(arena.score(byte, integer), 1);
        assert_eq!(arena.score(integer, byte), -1);
    }

    #[test]
    fn pointer_to_incomplete_is_complete() {
        let mut arena = TypeArena::new();
        let unresolved = arena.named(Rc::from("Forward"));
        let ptr = arena.pointer(unresolved);
        assert!(!arena.is_complete(unresolved));
        assert!(arena.is_complete(ptr));
    }

    #[test]
    fn self_referential_pointer_type_does_not_loop() {
        let mut arena = TypeArena::new();
        let alias = arena.named(Rc::from("T"));
        let ptr = arena.pointer(alias);
        arena.resolve_named(alias, ptr);
        // `check_type` must terminate: the `checked` flag fences re-entry.
        assert_eq!(arena.check_type(alias), Ok(()));
    }

    #[test]
    fn cyclic_check_type_terminates() {
        let mut arena = TypeArena::new();
        let alias = arena.named(Rc::from("Cyclic"));
        let ptr = arena.pointer(alias);
        arena.resolve_named(alias, ptr);
        assert_eq!(arena.check_type(ptr), Ok(()));
    }
}
