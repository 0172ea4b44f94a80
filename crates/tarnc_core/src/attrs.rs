//! Function attribute flags.
//!
//! Attributes are attached to [`crate::types::FunctionType`] and gate codegen-visible behavior
//! (discardability, purity, inlining, linkage). The analyzer validates the invariants below
//! when it finishes checking a function declaration; this module only knows the bit pattern.

use bitflags::bitflags;

bitflags! {
    /// Flags recognized on a function type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionAttrs: u8 {
        /// Caller may ignore the return value even though it is non-`void`.
        const DISCARDABLE = 1 << 0;
        /// Function has no observable side effects beyond its return value.
        const CONST = 1 << 1;
        /// Function reads no mutable global state (weaker than `const`).
        const PURE = 1 << 2;
        /// Function never returns to its caller.
        const NORETURN = 1 << 3;
        /// Request inlining at call sites.
        const INLINE = 1 << 4;
        /// Forbid inlining at call sites.
        const NOINLINE = 1 << 5;
        /// Force `USED` linkage even if the function appears dead.
        const USED = 1 << 6;
    }
}

/// Violation of a `FunctionAttrs` invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrError {
    /// `noreturn` was combined with `const` or `pure`.
    NoreturnWithEffectAttr,
    /// Both `inline` and `noinline` were requested.
    InlineConflict,
}

impl FunctionAttrs {
    /// Check the cross-attribute invariants from the type system design:
    /// `noreturn ⇒ ¬const ∧ ¬pure` and `¬(inline ∧ noinline)`.
    pub fn validate(self) -> Result<(), AttrError> {
        if self.contains(Self::NORETURN) && self.intersects(Self::CONST | Self::PURE) {
            return Err(AttrError::NoreturnWithEffectAttr);
        }
        if self.contains(Self::INLINE) && self.contains(Self::NOINLINE) {
            return Err(AttrError::InlineConflict);
        }
        Ok(())
    }
}

impl std::fmt::Display for AttrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrError::NoreturnWithEffectAttr => {
                write!(f, "`noreturn` cannot be combined with `const` or `pure`")
            }
            AttrError::InlineConflict => write!(f, "`inline` and `noinline` are mutually exclusive"),
        }
    }
}

impl std::error::Error for AttrError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noreturn_rejects_const_and_pure() {
        assert_eq!(
            (FunctionAttrs::NORETURN | FunctionAttrs::CONST).validate(),
            Err(AttrError::NoreturnWithEffectAttr)
        );
        assert_eq!(
            (FunctionAttrs::NORETURN | FunctionAttrs::PURE).validate(),
            Err(AttrError::NoreturnWithEffectAttr)
        );
    }

    #[test]
    fn inline_and_noinline_conflict() {
        assert_eq!(
            (FunctionAttrs::INLINE | FunctionAttrs::NOINLINE).validate(),
            Err(AttrError::InlineConflict)
        );
    }

    #[test]
    fn used_overrides_linkage_independently() {
        assert_eq!((FunctionAttrs::USED | FunctionAttrs::INLINE).validate(), Ok(()));
    }

    #[test]
    fn empty_is_valid() {
        assert_eq!(FunctionAttrs::empty().validate(), Ok(()));
    }
}
