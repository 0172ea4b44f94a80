//! String literal scanning for the tarn lexer.
//!
//! A string literal becomes a `Literal(String)` AST node of type `array of byte` sized
//! `len + 1` (the analyzer adds the trailing NUL byte's slot; the lexer just returns the
//! content).

use tarnc_core::Span;

use super::tokens::TokenKind;
use super::Lexer;
use crate::frontend::diagnostics::CompileError;

impl<'a> Lexer<'a> {
    pub(super) fn scan_string(&mut self, start: u32) {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => {
                        self.errors.push(CompileError::new(
                            "unterminated string literal".to_string(),
                            Span::new(start, self.current_pos),
                        ));
                        break;
                    }
                },
                Some(c) => value.push(c),
                None => {
                    self.errors.push(CompileError::new(
                        "unterminated string literal".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                    break;
                }
            }
        }
        self.add_token(TokenKind::Str(value), start);
    }
}
