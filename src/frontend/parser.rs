//! Recursive-descent parser for tarn source text.
//!
//! Builds directly into a [`tarnc_syntax::Ast`] arena rather than an intermediate owned tree —
//! every node the parser creates keeps the `NodeId` the analyzer will later see and possibly
//! rewrite.
//!
//! One deliberate simplification, since the spec treats parsing as an external collaborator and
//! is silent on concrete syntax: the parser has no scope information, so it can't know whether a
//! bare name denotes a variable or an overloaded function — it always emits `VariableReference`
//! and leaves that decision to the analyzer, which rewrites the node to `FunctionReference` in
//! place the first time scope lookup turns up function symbols for that name (see
//! `analyzer::names`).

use std::rc::Rc;

use tarnc_core::{FunctionAttrs, Span};
use tarnc_syntax::{Ast, BinaryOp, Literal, NodeId, NodeKind, ParamDecl, StructMemberDecl, TypeExpr, UnaryOp};

use crate::frontend::diagnostics::CompileError;
use crate::frontend::lexer::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    ast: Ast,
    errors: Vec<CompileError>,
}

/// Result of a successful parse: the arena and the `Root` node's id.
pub struct ParsedModule {
    pub ast: Ast,
    pub root: NodeId,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            ast: Ast::new(),
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<ParsedModule, Vec<CompileError>> {
        let start = self.peek().span;
        let mut children = Vec::new();
        while !self.is_at_end() {
            match self.top_level_item() {
                Ok(id) => children.push(id),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        let span = start.merge(self.previous().span);
        let root = self.ast.insert(NodeKind::Root { children: children.clone() }, span);
        for child in children {
            self.ast.set_parent(child, root);
        }

        if self.errors.is_empty() {
            Ok(ParsedModule { ast: self.ast, root })
        } else {
            Err(self.errors)
        }
    }

    // ===== token stream primitives =====

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<&Token, CompileError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(CompileError::new(format!("expected {context}, found {:?}", self.peek().kind), self.peek().span))
        }
    }

    fn expect_ident(&mut self) -> Result<(Rc<str>, Span), CompileError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = Rc::from(name.as_str());
                let span = self.peek().span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(CompileError::new(format!("expected identifier, found {:?}", self.peek().kind), self.peek().span)),
        }
    }

    /// Skip tokens until a plausible top-level item boundary, so one syntax error doesn't
    /// suppress diagnostics for the rest of the file.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if matches!(self.previous().kind, TokenKind::Semicolon | TokenKind::RBrace) {
                return;
            }
            if matches!(self.peek().kind, TokenKind::Struct | TokenKind::Import) {
                return;
            }
            self.advance();
        }
    }

    // ===== top-level items =====

    fn top_level_item(&mut self) -> Result<NodeId, CompileError> {
        match &self.peek().kind {
            TokenKind::Import => self.import_decl(),
            TokenKind::Struct => self.struct_decl(),
            _ => self.declaration_or_function(),
        }
    }

    fn import_decl(&mut self) -> Result<NodeId, CompileError> {
        let start = self.advance().span; // `import`
        let (name, _) = self.expect_ident()?;
        let end = self.expect(TokenKind::Semicolon, "`;` after import")?.span;
        Ok(self.ast.insert(NodeKind::ModuleReference { name }, start.merge(end)))
    }

    fn struct_decl(&mut self) -> Result<NodeId, CompileError> {
        let start = self.advance().span; // `struct`
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::LBrace, "`{` to open struct body")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let (mname, _) = self.expect_ident()?;
            self.expect(TokenKind::Colon, "`:` after struct member name")?;
            let type_expr = self.parse_type()?;
            self.expect(TokenKind::Semicolon, "`;` after struct member")?;
            members.push(StructMemberDecl { name: mname, type_expr });
        }
        let end = self.expect(TokenKind::RBrace, "`}` to close struct body")?.span;
        Ok(self.ast.insert(NodeKind::StructDeclaration { name, members }, start.merge(end)))
    }

    fn parse_attrs(&mut self) -> FunctionAttrs {
        let mut attrs = FunctionAttrs::empty();
        loop {
            let flag = match &self.peek().kind {
                TokenKind::Discardable => FunctionAttrs::DISCARDABLE,
                TokenKind::Const => FunctionAttrs::CONST,
                TokenKind::Pure => FunctionAttrs::PURE,
                TokenKind::Noreturn => FunctionAttrs::NORETURN,
                TokenKind::Inline => FunctionAttrs::INLINE,
                TokenKind::Noinline => FunctionAttrs::NOINLINE,
                TokenKind::Used => FunctionAttrs::USED,
                _ => break,
            };
            attrs |= flag;
            self.advance();
        }
        attrs
    }

    /// `name : type [(params)] [attrs] ({block} | = init ;| ;)`. Disambiguates a variable
    /// declaration from a function declaration on whether a parenthesized parameter list
    /// follows the type.
    fn declaration_or_function(&mut self) -> Result<NodeId, CompileError> {
        let (name, start) = self.expect_ident()?;
        self.expect(TokenKind::Colon, "`:` after declared name")?;
        let return_type = self.parse_type()?;

        if self.matches(&TokenKind::LParen) {
            let mut params = Vec::new();
            while !self.check(&TokenKind::RParen) {
                let (pname, pspan) = self.expect_ident()?;
                self.expect(TokenKind::Colon, "`:` after parameter name")?;
                let ptype = self.parse_type()?;
                params.push(ParamDecl { name: pname, type_expr: ptype, span: pspan });
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "`)` to close parameter list")?;
            let attrs = self.parse_attrs();

            let (body, end) = if self.check(&TokenKind::LBrace) {
                let block = self.block()?;
                let end = self.ast.get(block).span;
                (Some(block), end)
            } else {
                let end = self.expect(TokenKind::Semicolon, "`;` after function declaration")?.span;
                (None, end)
            };

            let id = self.ast.insert(
                NodeKind::Function { name, params, return_type, attrs, body },
                start.merge(end),
            );
            if let Some(body) = body {
                self.ast.set_parent(body, id);
            }
            return Ok(id);
        }

        let init = if self.matches(&TokenKind::Assign) {
            Some(self.expr()?)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semicolon, "`;` after declaration")?.span;

        let id = self.ast.insert(NodeKind::Declaration { name, type_expr: Some(return_type), init }, start.merge(end));
        if let Some(init) = init {
            self.ast.set_parent(init, id);
        }
        Ok(id)
    }

    // ===== statements =====

    fn block(&mut self) -> Result<NodeId, CompileError> {
        let start = self.expect(TokenKind::LBrace, "`{`")?.span;
        let mut children = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            children.push(self.stmt()?);
        }
        let end = self.expect(TokenKind::RBrace, "`}`")?.span;
        let id = self.ast.insert(NodeKind::Block { children: children.clone() }, start.merge(end));
        for child in children {
            self.ast.set_parent(child, id);
        }
        Ok(id)
    }

    fn stmt(&mut self) -> Result<NodeId, CompileError> {
        match &self.peek().kind {
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::LBrace => self.block(),
            TokenKind::Ident(_) if self.looks_like_declaration() => self.declaration_or_function(),
            _ => {
                let expr = self.expr()?;
                self.expect(TokenKind::Semicolon, "`;` after expression statement")?;
                Ok(expr)
            }
        }
    }

    /// `ident :` starts a declaration; any other use of an identifier (call, assignment,
    /// member access, ...) does not have a bare colon immediately after it.
    fn looks_like_declaration(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident(_))
            && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::Colon))
    }

    fn if_stmt(&mut self) -> Result<NodeId, CompileError> {
        let start = self.advance().span; // `if`
        self.expect(TokenKind::LParen, "`(` after `if`")?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen, "`)` after condition")?;
        let then_branch = self.stmt()?;
        let (else_branch, end) = if self.matches(&TokenKind::Else) {
            let else_branch = self.stmt()?;
            let end = self.ast.get(else_branch).span;
            (Some(else_branch), end)
        } else {
            (None, self.ast.get(then_branch).span)
        };
        let id = self.ast.insert(NodeKind::If { cond, then_branch, else_branch }, start.merge(end));
        self.ast.set_parent(cond, id);
        self.ast.set_parent(then_branch, id);
        if let Some(e) = else_branch {
            self.ast.set_parent(e, id);
        }
        Ok(id)
    }

    fn while_stmt(&mut self) -> Result<NodeId, CompileError> {
        let start = self.advance().span; // `while`
        self.expect(TokenKind::LParen, "`(` after `while`")?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen, "`)` after condition")?;
        let body = self.stmt()?;
        let end = self.ast.get(body).span;
        let id = self.ast.insert(NodeKind::While { cond, body }, start.merge(end));
        self.ast.set_parent(cond, id);
        self.ast.set_parent(body, id);
        Ok(id)
    }

    fn for_stmt(&mut self) -> Result<NodeId, CompileError> {
        let start = self.advance().span; // `for`
        self.expect(TokenKind::LParen, "`(` after `for`")?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen, "`)` after `for` condition")?;
        let body = self.stmt()?;
        let end = self.ast.get(body).span;
        let id = self.ast.insert(NodeKind::For { cond, body }, start.merge(end));
        self.ast.set_parent(cond, id);
        self.ast.set_parent(body, id);
        Ok(id)
    }

    fn return_stmt(&mut self) -> Result<NodeId, CompileError> {
        let start = self.advance().span; // `return`
        let value = if self.check(&TokenKind::Semicolon) { None } else { Some(self.expr()?) };
        let end = self.expect(TokenKind::Semicolon, "`;` after return")?.span;
        let id = self.ast.insert(NodeKind::Return { value }, start.merge(end));
        if let Some(v) = value {
            self.ast.set_parent(v, id);
        }
        Ok(id)
    }

    // ===== expressions (precedence climbing) =====

    fn expr(&mut self) -> Result<NodeId, CompileError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<NodeId, CompileError> {
        let lhs = self.comparison()?;
        let op = match &self.peek().kind {
            TokenKind::Assign => BinaryOp::Assign,
            TokenKind::AssignAlt => BinaryOp::AssignAlt,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.assignment()?;

        let span = self.ast.get(lhs).span.merge(self.ast.get(rhs).span);
        let id = self.ast.insert(NodeKind::Binary { op, lhs, rhs }, span);
        self.ast.set_parent(lhs, id);
        self.ast.set_parent(rhs, id);
        Ok(id)
    }

    fn comparison(&mut self) -> Result<NodeId, CompileError> {
        let mut lhs = self.bitor()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.bitor()?;
            lhs = self.binary_node(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn bitor(&mut self) -> Result<NodeId, CompileError> {
        let mut lhs = self.bitxor()?;
        while self.check(&TokenKind::Pipe) {
            self.advance();
            let rhs = self.bitxor()?;
            lhs = self.binary_node(BinaryOp::BitOr, lhs, rhs);
        }
        Ok(lhs)
    }

    fn bitxor(&mut self) -> Result<NodeId, CompileError> {
        let mut lhs = self.bitand()?;
        while self.check(&TokenKind::Caret) {
            self.advance();
            let rhs = self.bitand()?;
            lhs = self.binary_node(BinaryOp::BitXor, lhs, rhs);
        }
        Ok(lhs)
    }

    fn bitand(&mut self) -> Result<NodeId, CompileError> {
        let mut lhs = self.shift()?;
        while self.check(&TokenKind::Amp) {
            self.advance();
            let rhs = self.shift()?;
            lhs = self.binary_node(BinaryOp::BitAnd, lhs, rhs);
        }
        Ok(lhs)
    }

    fn shift(&mut self) -> Result<NodeId, CompileError> {
        let mut lhs = self.term()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Shl => BinaryOp::Shl,
                TokenKind::Shr => BinaryOp::Shr,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            lhs = self.binary_node(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<NodeId, CompileError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.factor()?;
            lhs = self.binary_node(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<NodeId, CompileError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = self.binary_node(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn binary_node(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let span = self.ast.get(lhs).span.merge(self.ast.get(rhs).span);
        let id = self.ast.insert(NodeKind::Binary { op, lhs, rhs }, span);
        self.ast.set_parent(lhs, id);
        self.ast.set_parent(rhs, id);
        id
    }

    fn unary(&mut self) -> Result<NodeId, CompileError> {
        let op = match &self.peek().kind {
            TokenKind::At => Some(UnaryOp::Deref),
            TokenKind::Amp => Some(UnaryOp::AddressOf),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        let Some(op) = op else { return self.postfix() };
        let start = self.advance().span;
        let operand = self.unary()?;
        let span = start.merge(self.ast.get(operand).span);
        let id = self.ast.insert(NodeKind::Unary { op, operand }, span);
        self.ast.set_parent(operand, id);
        Ok(id)
    }

    fn postfix(&mut self) -> Result<NodeId, CompileError> {
        let mut expr = self.primary()?;
        loop {
            match &self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(&TokenKind::RParen) {
                        args.push(self.expr()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen, "`)` to close call arguments")?.span;
                    let span = self.ast.get(expr).span.merge(end);
                    let id = self.ast.insert(NodeKind::Call { callee: expr, args: args.clone() }, span);
                    self.ast.set_parent(expr, id);
                    for a in &args {
                        self.ast.set_parent(*a, id);
                    }
                    expr = id;
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expr()?;
                    let end = self.expect(TokenKind::RBracket, "`]` to close subscript")?.span;
                    let span = self.ast.get(expr).span.merge(end);
                    let id = self.ast.insert(NodeKind::Binary { op: BinaryOp::Subscript, lhs: expr, rhs: index }, span);
                    self.ast.set_parent(expr, id);
                    self.ast.set_parent(index, id);
                    expr = id;
                }
                TokenKind::Dot => {
                    self.advance();
                    let (member, mspan) = self.expect_ident()?;
                    let span = self.ast.get(expr).span.merge(mspan);
                    let id = self.ast.insert(NodeKind::MemberAccess { lhs: expr, member, member_index: None }, span);
                    self.ast.set_parent(expr, id);
                    expr = id;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<NodeId, CompileError> {
        let span = self.peek().span;
        match self.peek().kind.clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok(self.ast.insert(NodeKind::Literal(Literal::Number(value)), span))
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(self.ast.insert(NodeKind::Literal(Literal::String(Rc::from(value.as_str()))), span))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBrace) {
                    elements.push(self.expr()?);
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.expect(TokenKind::RBrace, "`}` to close compound literal")?.span;
                let id = self.ast.insert(NodeKind::Literal(Literal::CompoundArray(elements.clone())), span.merge(end));
                for e in elements {
                    self.ast.set_parent(e, id);
                }
                Ok(id)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expr()?;
                self.expect(TokenKind::RParen, "`)` to close parenthesized expression")?;
                Ok(expr)
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(self.ast.insert(NodeKind::VariableReference { name: Rc::from(name.as_str()), resolved: None }, span))
            }
            _ => Err(CompileError::new(format!("expected an expression, found {:?}", self.peek().kind), span)),
        }
    }

    // ===== type expressions =====

    fn parse_type(&mut self) -> Result<TypeExpr, CompileError> {
        let base = match &self.peek().kind {
            TokenKind::At => {
                self.advance();
                TypeExpr::Pointer(Box::new(self.parse_type()?))
            }
            TokenKind::Amp => {
                self.advance();
                TypeExpr::Reference(Box::new(self.parse_type()?))
            }
            TokenKind::Ident(name) => {
                let name = Rc::from(name.as_str());
                self.advance();
                TypeExpr::Named(name)
            }
            _ => return Err(CompileError::new(format!("expected a type, found {:?}", self.peek().kind), self.peek().span)),
        };

        let mut ty = if self.matches(&TokenKind::LParen) {
            let mut params = Vec::new();
            while !self.check(&TokenKind::RParen) {
                params.push(self.parse_type()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "`)` to close function type parameter list")?;
            TypeExpr::Function { return_type: Box::new(base), params }
        } else {
            base
        };

        while self.check(&TokenKind::LBracket) {
            self.advance();
            let len_tok = self.expect(TokenKind::Int(0), "array length")?;
            let len = match len_tok.kind {
                TokenKind::Int(n) => n as u64,
                _ => unreachable!(),
            };
            self.expect(TokenKind::RBracket, "`]` to close array type")?;
            ty = TypeExpr::Array(Box::new(ty), len);
        }
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn parse(source: &str) -> ParsedModule {
        let tokens = Lexer::new(source).tokenize().expect("lex");
        Parser::new(&tokens).parse().expect("parse")
    }

    #[test]
    fn parses_a_simple_declaration() {
        let parsed = parse("foo : integer = 5;");
        match &parsed.ast.get(parsed.root).kind {
            NodeKind::Root { children } => assert_eq!(children.len(), 1),
            _ => panic!("expected root"),
        }
    }

    #[test]
    fn parses_a_function_with_body() {
        let parsed = parse("f : integer(x : integer) { return x; }");
        let NodeKind::Root { children } = &parsed.ast.get(parsed.root).kind else { panic!() };
        let NodeKind::Function { name, params, body, .. } = &parsed.ast.get(children[0]).kind else {
            panic!("expected function")
        };
        assert_eq!(name.as_ref(), "f");
        assert_eq!(params.len(), 1);
        assert!(body.is_some());
    }

    #[test]
    fn parses_a_struct_declaration() {
        let parsed = parse("struct S { a : byte; b : integer; }");
        let NodeKind::Root { children } = &parsed.ast.get(parsed.root).kind else { panic!() };
        let NodeKind::StructDeclaration { members, .. } = &parsed.ast.get(children[0]).kind else {
            panic!("expected struct")
        };
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn call_callee_parses_as_a_plain_reference_pending_resolution() {
        let parsed = parse("f : integer(x : integer) { return g(x); }");
        let NodeKind::Root { children } = &parsed.ast.get(parsed.root).kind else { panic!() };
        let NodeKind::Function { body: Some(body), .. } = &parsed.ast.get(children[0]).kind else { panic!() };
        let NodeKind::Block { children: stmts } = &parsed.ast.get(*body).kind else { panic!() };
        let NodeKind::Return { value: Some(call) } = &parsed.ast.get(stmts[0]).kind else { panic!() };
        let NodeKind::Call { callee, .. } = &parsed.ast.get(*call).kind else { panic!("expected call") };
        assert!(matches!(parsed.ast.get(*callee).kind, NodeKind::VariableReference { .. }));
    }
}
