//! Reserved `__builtin_*` names recognized by the semantic analyzer.
//!
//! Intrinsic dispatch is name-based: a call whose callee is a bare identifier matching one of
//! these names is lowered specially instead of going through overload resolution. This module
//! only owns the name table; arity and argument-type rules live in the analyzer since they need
//! typed arguments.

/// A reserved intrinsic, keyed by its source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Syscall,
    Inline,
    Line,
    Filename,
    Debugtrap,
    Memcpy,
}

impl Intrinsic {
    /// Look up an intrinsic by the exact name a callee identifier would carry.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "__builtin_syscall" => Self::Syscall,
            "__builtin_inline" => Self::Inline,
            "__builtin_line" => Self::Line,
            "__builtin_filename" => Self::Filename,
            "__builtin_debugtrap" => Self::Debugtrap,
            "__builtin_memcpy" => Self::Memcpy,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Syscall => "__builtin_syscall",
            Self::Inline => "__builtin_inline",
            Self::Line => "__builtin_line",
            Self::Filename => "__builtin_filename",
            Self::Debugtrap => "__builtin_debugtrap",
            Self::Memcpy => "__builtin_memcpy",
        }
    }
}

impl std::fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_name() {
        for intrinsic in [
            Intrinsic::Syscall,
            Intrinsic::Inline,
            Intrinsic::Line,
            Intrinsic::Filename,
            Intrinsic::Debugtrap,
            Intrinsic::Memcpy,
        ] {
            assert_eq!(Intrinsic::from_name(intrinsic.name()), Some(intrinsic));
        }
    }

    #[test]
    fn unknown_name_is_not_an_intrinsic() {
        assert_eq!(Intrinsic::from_name("printf"), None);
        assert_eq!(Intrinsic::from_name("__builtin_unknown"), None);
    }
}
