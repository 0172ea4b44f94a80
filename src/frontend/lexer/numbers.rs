//! Number literal scanning for the tarn lexer.
//!
//! The source language has no floating-point type (see the type system's `Primitive` variants),
//! so this only ever produces `TokenKind::Int`.

use tarnc_core::Span;

use super::tokens::TokenKind;
use super::Lexer;
use crate::frontend::diagnostics::CompileError;

impl<'a> Lexer<'a> {
    pub(super) fn scan_number(&mut self, start: u32, first: char) {
        if first == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            return self.scan_radix_number(start, 16, |c| c.is_ascii_hexdigit());
        }
        if first == '0' && matches!(self.peek(), Some('b') | Some('B')) {
            self.advance();
            return self.scan_radix_number(start, 2, |c| c == '0' || c == '1');
        }

        let mut digits = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                if c != '_' {
                    digits.push(c);
                }
                self.advance();
            } else {
                break;
            }
        }
        self.finish_number(start, &digits, 10);
    }

    fn scan_radix_number(&mut self, start: u32, radix: u32, is_digit: impl Fn(char) -> bool) {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if is_digit(c) || c == '_' {
                if c != '_' {
                    digits.push(c);
                }
                self.advance();
            } else {
                break;
            }
        }
        self.finish_number(start, &digits, radix);
    }

    fn finish_number(&mut self, start: u32, digits: &str, radix: u32) {
        match i128::from_str_radix(digits, radix) {
            Ok(value) => self.add_token(TokenKind::Int(value), start),
            Err(_) => self.errors.push(CompileError::new(
                format!("invalid integer literal `{digits}`"),
                Span::new(start, self.current_pos),
            )),
        }
    }
}
