//! Lexer for tarn source text.
//!
//! Tokenizes a brace-and-semicolon-delimited C-like surface syntax: no indentation tracking, no
//! line continuation rules — whitespace (including newlines) is insignificant outside of string
//! literals and comments.
//!
//! ## Module structure
//!
//! - `tokens` — `TokenKind`, `Token`, the keyword table.
//! - `numbers` — integer literal scanning (decimal, `0x`, `0b`).
//! - `strings` — string literal scanning with escapes.

mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{Token, TokenKind};

use tarnc_core::Span;
use tokens::KEYWORDS;

use crate::frontend::diagnostics::CompileError;

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: u32,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source. The returned stream always ends with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<CompileError>> {
        while !self.is_at_end() {
            self.scan_token();
        }
        self.tokens.push(Token::new(TokenKind::Eof, Span::new(self.current_pos, self.current_pos)));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos as usize..].char_indices();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos as u32 + c.len_utf8() as u32;
            Some(c)
        } else {
            None
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: u32) {
        self.tokens.push(Token::new(kind, Span::new(start, self.current_pos)));
    }

    /// Try to match one of `compounds`' second characters, else fall back to `simple`.
    fn operator(&mut self, start: u32, simple: TokenKind, compounds: &[(char, TokenKind)]) {
        for (c, kind) in compounds {
            if self.match_char(*c) {
                self.add_token(kind.clone(), start);
                return;
            }
        }
        self.add_token(simple, start);
    }

    fn scan_token(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }

        let start = self.current_pos;
        let Some(c) = self.advance() else { return };

        match c {
            '/' if self.peek() == Some('/') => {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            }
            '/' if self.peek() == Some('*') => {
                self.advance();
                while !self.is_at_end() {
                    if self.peek() == Some('*') && self.peek_next() == Some('/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
            }

            '+' => self.add_token(TokenKind::Plus, start),
            '-' => self.add_token(TokenKind::Minus, start),
            '*' => self.add_token(TokenKind::Star, start),
            '/' => self.add_token(TokenKind::Slash, start),
            '%' => self.add_token(TokenKind::Percent, start),
            '&' => self.add_token(TokenKind::Amp, start),
            '|' => self.add_token(TokenKind::Pipe, start),
            '^' => self.add_token(TokenKind::Caret, start),
            '~' => self.add_token(TokenKind::Tilde, start),
            '@' => self.add_token(TokenKind::At, start),
            ',' => self.add_token(TokenKind::Comma, start),
            '.' => self.add_token(TokenKind::Dot, start),
            ';' => self.add_token(TokenKind::Semicolon, start),
            '(' => self.add_token(TokenKind::LParen, start),
            ')' => self.add_token(TokenKind::RParen, start),
            '[' => self.add_token(TokenKind::LBracket, start),
            ']' => self.add_token(TokenKind::RBracket, start),
            '{' => self.add_token(TokenKind::LBrace, start),
            '}' => self.add_token(TokenKind::RBrace, start),

            ':' => self.operator(start, TokenKind::Colon, &[('=', TokenKind::Assign), (':', TokenKind::AssignAlt)]),
            '=' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::EqEq, start);
                } else {
                    self.errors.push(CompileError::new(
                        "unexpected character '='; did you mean `==` or `:=`?".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::NotEq, start);
                } else {
                    self.errors.push(CompileError::new(
                        "unexpected character '!'".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                }
            }
            '<' => self.operator(start, TokenKind::Lt, &[('=', TokenKind::LtEq), ('<', TokenKind::Shl)]),
            '>' => self.operator(start, TokenKind::Gt, &[('=', TokenKind::GtEq), ('>', TokenKind::Shr)]),

            '"' => self.scan_string(start),
            '0'..='9' => self.scan_number(start, c),
            _ if is_ident_start(c) => self.scan_identifier(start, c),

            _ => self.errors.push(CompileError::new(
                format!("unexpected character '{c}'"),
                Span::new(start, self.current_pos),
            )),
        }
    }

    fn scan_identifier(&mut self, start: u32, first: char) {
        let mut name = String::from(first);
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = KEYWORDS.get(name.as_str()).cloned().unwrap_or(TokenKind::Ident(name));
        self.add_token(kind, start);
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_declaration() {
        assert_eq!(
            kinds("foo : integer = 5;"),
            vec![
                TokenKind::Ident("foo".into()),
                TokenKind::Colon,
                TokenKind::Ident("integer".into()),
                TokenKind::EqEq,
                TokenKind::Int(5),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_assign_from_colon() {
        assert_eq!(
            kinds("x := 1;"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::Int(1),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn hex_and_binary_literals() {
        assert_eq!(kinds("0xFF"), vec![TokenKind::Int(255), TokenKind::Eof]);
        assert_eq!(kinds("0b101"), vec![TokenKind::Int(5), TokenKind::Eof]);
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(kinds("// hi\n1 /* mid */ 2"), vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]);
    }
}
