//! Statement parsing: declarations, control flow, blocks.

use tally_lexer::token::TokenKind;
use tally_types::ast::*;
use tally_types::{ErrorCode, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse the whole token stream as a `Program`.
    pub(crate) fn parse_program(&mut self) -> Option<Node> {
        let mut body = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(),
            }
        }
        let end = self.source_len();
        Some(Node::new(NodeKind::Program { body }, Span::new(0, end)))
    }

    fn source_len(&self) -> u32 {
        // The Eof token sits at the end of the source.
        self.current_span().end.max(self.previous_span().end)
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Node> {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                self.parse_variable_declaration(true)
            }
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::With => self.parse_with(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Break => {
                let start = self.advance().span;
                let end = self.expect_semicolon();
                Some(Node::new(NodeKind::BreakStatement, start.merge(end)))
            }
            TokenKind::Continue => {
                let start = self.advance().span;
                let end = self.expect_semicolon();
                Some(Node::new(NodeKind::ContinueStatement, start.merge(end)))
            }
            TokenKind::Semicolon => {
                let span = self.advance().span;
                Some(Node::new(NodeKind::EmptyStatement, span))
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::LBrace)?.span;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(),
            }
        }
        let end = self.expect(&TokenKind::RBrace).map(|t| t.span)?;
        Some(Node::new(
            NodeKind::BlockStatement { body },
            start.merge(end),
        ))
    }

    /// `expr;`
    fn parse_expression_statement(&mut self) -> Option<Node> {
        let expr = self.parse_expression()?;
        let end = self.expect_semicolon();
        let span = expr.span.merge(end);
        Some(Node::new(
            NodeKind::ExpressionStatement {
                expression: Box::new(expr),
            },
            span,
        ))
    }

    /// `var|let|const declarators [;]`
    ///
    /// `consume_semi` is `false` in for-loop headers, where the `;` (or the
    /// `in`/`of` keyword) belongs to the loop.
    pub(crate) fn parse_variable_declaration(&mut self, consume_semi: bool) -> Option<Node> {
        let kw = self.advance();
        let decl_kind = match kw.kind {
            TokenKind::Var => DeclKind::Var,
            TokenKind::Let => DeclKind::Let,
            TokenKind::Const => DeclKind::Const,
            _ => unreachable!("caller checked the declaration keyword"),
        };
        let start = kw.span;

        let mut declarations = Vec::new();
        loop {
            let decl = self.parse_variable_declarator()?;
            declarations.push(decl);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let mut span = start;
        for d in &declarations {
            span = span.merge(d.span);
        }
        if consume_semi {
            span = span.merge(self.expect_semicolon());
        }
        Some(Node::new(
            NodeKind::VariableDeclaration {
                decl_kind,
                declarations,
            },
            span,
        ))
    }

    /// One `id [= init]` inside a declaration.
    fn parse_variable_declarator(&mut self) -> Option<Node> {
        let id = self.parse_binding_target()?;
        let mut span = id.span;
        let init = if self.eat(&TokenKind::Assign) {
            let value = self.parse_assignment()?;
            span = span.merge(value.span);
            Some(Box::new(value))
        } else {
            None
        };
        Some(Node::new(
            NodeKind::VariableDeclarator {
                id: Box::new(id),
                init,
            },
            span,
        ))
    }

    /// An identifier or array-destructuring pattern in binding position.
    fn parse_binding_target(&mut self) -> Option<Node> {
        if self.check(&TokenKind::LBracket) {
            self.parse_array_pattern()
        } else {
            self.expect_identifier()
        }
    }

    /// `[a, , [b, c]]`
    fn parse_array_pattern(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::LBracket)?.span;
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.at_end() {
            if self.check(&TokenKind::Comma) {
                // Elision
                self.advance();
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_binding_target()?));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBracket)?.span;
        Some(Node::new(
            NodeKind::ArrayPattern { elements },
            start.merge(end),
        ))
    }

    /// `function [*] name (params) { body }`
    fn parse_function_declaration(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::Function)?.span;
        let generator = self.eat(&TokenKind::Star);
        let id = self.expect_identifier()?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Node::new(
            NodeKind::FunctionDeclaration {
                id: Box::new(id),
                params,
                body: Box::new(body),
                generator,
            },
            span,
        ))
    }

    /// `( a, b, c )` — simple identifier parameters.
    pub(crate) fn parse_params(&mut self) -> Option<Vec<Node>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            params.push(self.expect_identifier()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    /// `return [expr];`
    fn parse_return(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::Return)?.span;
        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
        {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        let end = self.expect_semicolon();
        Some(Node::new(
            NodeKind::ReturnStatement { argument },
            start.merge(end),
        ))
    }

    /// `throw expr;`
    fn parse_throw(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::Throw)?.span;
        let argument = self.parse_expression()?;
        let end = self.expect_semicolon();
        Some(Node::new(
            NodeKind::ThrowStatement {
                argument: Box::new(argument),
            },
            start.merge(end),
        ))
    }

    /// `if (test) consequent [else alternate]`
    fn parse_if(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::If)?.span;
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let consequent = self.parse_statement()?;
        let mut span = start.merge(consequent.span);
        let alternate = if self.eat(&TokenKind::Else) {
            let alt = self.parse_statement()?;
            span = span.merge(alt.span);
            Some(Box::new(alt))
        } else {
            None
        };
        Some(Node::new(
            NodeKind::IfStatement {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
            span,
        ))
    }

    /// `while (test) body`
    fn parse_while(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::While)?.span;
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = start.merge(body.span);
        Some(Node::new(
            NodeKind::WhileStatement {
                test: Box::new(test),
                body: Box::new(body),
            },
            span,
        ))
    }

    /// `do body while (test);`
    fn parse_do_while(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::Do)?.span;
        let body = self.parse_statement()?;
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        let rparen = self.expect(&TokenKind::RParen)?.span;
        let mut span = start.merge(rparen);
        if self.check(&TokenKind::Semicolon) {
            span = span.merge(self.advance().span);
        }
        Some(Node::new(
            NodeKind::DoWhileStatement {
                body: Box::new(body),
                test: Box::new(test),
            },
            span,
        ))
    }

    /// `with (object) body`
    fn parse_with(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::With)?.span;
        self.expect(&TokenKind::LParen)?;
        let object = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = start.merge(body.span);
        Some(Node::new(
            NodeKind::WithStatement {
                object: Box::new(object),
                body: Box::new(body),
            },
            span,
        ))
    }

    /// `switch (discriminant) { cases... }`
    fn parse_switch(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::Switch)?.span;
        self.expect(&TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;
        let mut cases = Vec::new();
        let mut saw_default = false;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let case = self.parse_switch_case(&mut saw_default)?;
            cases.push(case);
        }
        let end = self.expect(&TokenKind::RBrace)?.span;
        Some(Node::new(
            NodeKind::SwitchStatement {
                discriminant: Box::new(discriminant),
                cases,
            },
            start.merge(end),
        ))
    }

    /// `case expr: stmts...` or `default: stmts...`
    fn parse_switch_case(&mut self, saw_default: &mut bool) -> Option<Node> {
        let (start, test) = if self.check(&TokenKind::Case) {
            let start = self.advance().span;
            let test = self.parse_expression()?;
            (start, Some(Box::new(test)))
        } else if self.check(&TokenKind::Default) {
            let start = self.advance().span;
            if *saw_default {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "more than one 'default' clause in switch",
                    start,
                );
            }
            *saw_default = true;
            (start, None)
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected 'case' or 'default', got '{}'", self.peek_kind()),
            );
            return None;
        };
        self.expect(&TokenKind::Colon)?;
        let mut consequent = Vec::new();
        let mut span = start.merge(self.previous_span());
        while !self.check(&TokenKind::Case)
            && !self.check(&TokenKind::Default)
            && !self.check(&TokenKind::RBrace)
            && !self.at_end()
        {
            let stmt = self.parse_statement()?;
            span = span.merge(stmt.span);
            consequent.push(stmt);
        }
        Some(Node::new(NodeKind::SwitchCase { test, consequent }, span))
    }

    /// `for (...) body` — classic, for-in, or for-of.
    fn parse_for(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::For)?.span;
        self.expect(&TokenKind::LParen)?;

        // Left / init clause.
        let init: Option<Node> = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek_kind(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            Some(self.parse_variable_declaration(false)?)
        } else {
            Some(self.parse_expression()?)
        };

        // for-in / for-of?
        if let Some(left) = init {
            if self.eat(&TokenKind::In) {
                return self.finish_for_each(start, left, true);
            }
            if self.is_of_keyword() {
                self.advance(); // 'of'
                return self.finish_for_each(start, left, false);
            }
            self.expect(&TokenKind::Semicolon)?;
            return self.finish_classic_for(start, Some(left));
        }
        self.expect(&TokenKind::Semicolon)?;
        self.finish_classic_for(start, None)
    }

    /// `of` is a contextual keyword — it lexes as an identifier.
    fn is_of_keyword(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Identifier(name) if name == "of")
    }

    fn finish_classic_for(&mut self, start: Span, init: Option<Node>) -> Option<Node> {
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = start.merge(body.span);
        Some(Node::new(
            NodeKind::ForStatement {
                init: init.map(Box::new),
                test,
                update,
                body: Box::new(body),
            },
            span,
        ))
    }

    fn finish_for_each(&mut self, start: Span, left: Node, is_in: bool) -> Option<Node> {
        let right = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = start.merge(body.span);
        let kind = if is_in {
            NodeKind::ForInStatement {
                left: Box::new(left),
                right: Box::new(right),
                body: Box::new(body),
            }
        } else {
            NodeKind::ForOfStatement {
                left: Box::new(left),
                right: Box::new(right),
                body: Box::new(body),
            }
        };
        Some(Node::new(kind, span))
    }
}
