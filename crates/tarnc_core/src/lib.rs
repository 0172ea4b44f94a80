//! Shared, pure semantic vocabulary for the tarn compiler.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers
//! that both the semantic analyzer and (eventually) the code generator can share:
//!
//! - [`attrs`]: the function attribute flag set and its invariants.
//! - [`intrinsics`]: the reserved `__builtin_*` name registry.
//! - [`types`]: the `Type` arena, canonicalization, convertibility scoring and layout engine.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no diagnostics sink, no AST types. Callers
//!   (the analyzer) turn the `Result`s produced here into diagnostics.
//! - Every query here is a pure function of the arena's current contents; nothing here reaches
//!   outside of `&self`/`&mut self`.

pub mod attrs;
pub mod intrinsics;
pub mod span;
pub mod types;

pub use attrs::{AttrError, FunctionAttrs};
pub use intrinsics::Intrinsic;
pub use span::Span;
pub use types::{
    ConvertError, FunctionType, LayoutError, NamedType, Param, Primitive, StructMember, StructType,
    Type, TypeArena, TypeId,
};
