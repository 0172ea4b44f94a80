//! Token types for the tarn lexer.

use phf::phf_map;
use tarnc_core::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keywords ==========
    Struct,
    If,
    Else,
    While,
    For,
    Return,
    Import,
    Discardable,
    Const,
    Pure,
    Noreturn,
    Inline,
    Noinline,
    Used,

    // ========== Identifiers and literals ==========
    Ident(String),
    Int(i128),
    Str(String),

    // ========== Operators and punctuation ==========
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    At,
    Shl,
    Shr,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    /// `:=`
    Assign,
    /// `::`
    AssignAlt,
    Colon,
    Semicolon,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Eof,
}

/// Reserved words recognized by the lexer. Everything else that looks like an identifier stays
/// an `Ident`; the `__builtin_*` intrinsic names are *not* here — they're ordinary identifiers
/// that [`tarnc_core::Intrinsic::from_name`] recognizes once the analyzer sees them as a call
/// callee.
pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "struct" => TokenKind::Struct,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "return" => TokenKind::Return,
    "import" => TokenKind::Import,
    "discardable" => TokenKind::Discardable,
    "const" => TokenKind::Const,
    "pure" => TokenKind::Pure,
    "noreturn" => TokenKind::Noreturn,
    "inline" => TokenKind::Inline,
    "noinline" => TokenKind::Noinline,
    "used" => TokenKind::Used,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
