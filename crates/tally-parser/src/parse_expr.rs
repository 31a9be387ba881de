//! Expression parsing, one precedence level per function.

use tally_lexer::token::TokenKind;
use tally_types::ast::*;
use tally_types::{ErrorCode, Span};

use crate::parser::Parser;

/// Expressions nested deeper than this are rejected rather than risking a
/// stack overflow on hostile input.
const MAX_EXPR_DEPTH: u32 = 64;

impl<'src> Parser<'src> {
    /// Entry point for a full expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Node> {
        self.parse_assignment()
    }

    /// Assignment level, with the nesting-depth guard. Every recursive
    /// re-entry into the expression grammar passes through here.
    pub(crate) fn parse_assignment(&mut self) -> Option<Node> {
        if self.expr_depth >= MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("expression nesting exceeds {} levels", MAX_EXPR_DEPTH),
            );
            return None;
        }
        self.expr_depth += 1;
        let result = self.parse_assignment_inner();
        self.expr_depth -= 1;
        result
    }

    fn parse_assignment_inner(&mut self) -> Option<Node> {
        if self.check(&TokenKind::Yield) {
            return self.parse_yield();
        }
        if self.at_arrow_function() {
            return self.parse_arrow_function();
        }

        let left = self.parse_conditional()?;

        let op = match self.peek_kind() {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::AddAssign,
            TokenKind::MinusAssign => AssignOp::SubAssign,
            TokenKind::StarAssign => AssignOp::MulAssign,
            TokenKind::SlashAssign => AssignOp::DivAssign,
            TokenKind::PercentAssign => AssignOp::ModAssign,
            _ => return Some(left),
        };
        if !matches!(
            left.kind,
            NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }
        ) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "invalid assignment target",
                left.span,
            );
            return None;
        }
        self.advance();
        let right = self.parse_assignment()?;
        let span = left.span.merge(right.span);
        Some(Node::new(
            NodeKind::AssignmentExpression {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        ))
    }

    /// `yield [*] [expr]`
    fn parse_yield(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::Yield)?.span;
        let delegate = self.eat(&TokenKind::Star);
        let has_argument = !matches!(
            self.peek_kind(),
            TokenKind::Semicolon
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Eof
        );
        let mut span = start;
        if delegate {
            span = span.merge(self.previous_span());
        }
        let argument = if has_argument || delegate {
            let arg = self.parse_assignment()?;
            span = span.merge(arg.span);
            Some(Box::new(arg))
        } else {
            None
        };
        Some(Node::new(
            NodeKind::YieldExpression { argument, delegate },
            span,
        ))
    }

    /// True when the tokens ahead form an arrow function: either a bare
    /// identifier followed by `=>`, or a parenthesized parameter list whose
    /// closing `)` is followed by `=>`.
    fn at_arrow_function(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Identifier(_) => matches!(self.look_ahead(1), TokenKind::Arrow),
            TokenKind::LParen => match self.matching_paren_end() {
                Some(end) => matches!(self.look_ahead(end - self.pos()), TokenKind::Arrow),
                None => false,
            },
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Option<Node> {
        let start = self.current_span();
        let params = if self.check(&TokenKind::LParen) {
            self.parse_params()?
        } else {
            vec![self.expect_identifier()?]
        };
        self.expect(&TokenKind::Arrow)?;
        let (body, expression) = if self.check(&TokenKind::LBrace) {
            (self.parse_block()?, false)
        } else {
            (self.parse_assignment()?, true)
        };
        let span = start.merge(body.span);
        Some(Node::new(
            NodeKind::ArrowFunctionExpression {
                params,
                body: Box::new(body),
                expression,
            },
            span,
        ))
    }

    /// `test ? consequent : alternate`
    fn parse_conditional(&mut self) -> Option<Node> {
        let test = self.parse_logical_or()?;
        if !self.eat(&TokenKind::Question) {
            return Some(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = test.span.merge(alternate.span);
        Some(Node::new(
            NodeKind::ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        ))
    }

    fn parse_logical_or(&mut self) -> Option<Node> {
        let mut left = self.parse_logical_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_logical_and()?;
            left = logical(LogicalOp::Or, left, right);
        }
        Some(left)
    }

    fn parse_logical_and(&mut self) -> Option<Node> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            left = logical(LogicalOp::And, left, right);
        }
        Some(left)
    }

    fn parse_equality(&mut self) -> Option<Node> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::EqEqEq => BinaryOp::StrictEq,
                TokenKind::NotEqEq => BinaryOp::StrictNotEq,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
    }

    fn parse_relational(&mut self) -> Option<Node> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::LessEq => BinaryOp::LessEq,
                TokenKind::GreaterEq => BinaryOp::GreaterEq,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Option<Node> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Option<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Option<Node> {
        let op = match self.peek_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::TypeOf => Some(UnaryOp::TypeOf),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.advance().span;
            let argument = self.parse_unary()?;
            let span = start.merge(argument.span);
            return Some(Node::new(
                NodeKind::UnaryExpression {
                    op,
                    argument: Box::new(argument),
                },
                span,
            ));
        }
        if matches!(self.peek_kind(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if self.check(&TokenKind::PlusPlus) {
                UpdateOp::Incr
            } else {
                UpdateOp::Decr
            };
            let start = self.advance().span;
            let argument = self.parse_unary()?;
            self.check_update_target(&argument);
            let span = start.merge(argument.span);
            return Some(Node::new(
                NodeKind::UpdateExpression {
                    op,
                    argument: Box::new(argument),
                    prefix: true,
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    fn check_update_target(&mut self, argument: &Node) {
        if !matches!(
            argument.kind,
            NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }
        ) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "invalid increment/decrement target",
                argument.span,
            );
        }
    }

    fn parse_postfix(&mut self) -> Option<Node> {
        let expr = self.parse_call_member()?;
        if matches!(self.peek_kind(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if self.check(&TokenKind::PlusPlus) {
                UpdateOp::Incr
            } else {
                UpdateOp::Decr
            };
            let end = self.advance().span;
            self.check_update_target(&expr);
            let span = expr.span.merge(end);
            return Some(Node::new(
                NodeKind::UpdateExpression {
                    op,
                    argument: Box::new(expr),
                    prefix: false,
                },
                span,
            ));
        }
        Some(expr)
    }

    /// Call and member chains: `a.b`, `a[b]`, `a(b)`, `new a(b)`.
    fn parse_call_member(&mut self) -> Option<Node> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_member_name()?;
                    let span = expr.span.merge(property.span);
                    expr = Node::new(
                        NodeKind::MemberExpression {
                            object: Box::new(expr),
                            property: Box::new(property),
                            computed: false,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expression()?;
                    let end = self.expect(&TokenKind::RBracket)?.span;
                    let span = expr.span.merge(end);
                    expr = Node::new(
                        NodeKind::MemberExpression {
                            object: Box::new(expr),
                            property: Box::new(property),
                            computed: true,
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    let (arguments, end) = self.parse_arguments()?;
                    let span = expr.span.merge(end);
                    expr = Node::new(
                        NodeKind::CallExpression {
                            callee: Box::new(expr),
                            arguments,
                        },
                        span,
                    );
                }
                _ => return Some(expr),
            }
        }
    }

    /// `new callee(args)` and `new.target`.
    fn parse_new(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::New)?.span;

        if self.eat(&TokenKind::Dot) {
            let property = self.expect_member_name()?;
            if !matches!(&property.kind, NodeKind::Identifier { name } if name == "target") {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "the only valid meta property for 'new' is 'new.target'",
                    property.span,
                );
                return None;
            }
            let meta = Node::new(
                NodeKind::Identifier {
                    name: "new".to_string(),
                },
                start,
            );
            let span = start.merge(property.span);
            return Some(Node::new(
                NodeKind::MetaProperty {
                    meta: Box::new(meta),
                    property: Box::new(property),
                },
                span,
            ));
        }

        // The callee binds member accesses but not calls.
        let mut callee = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_member_name()?;
                    let span = callee.span.merge(property.span);
                    callee = Node::new(
                        NodeKind::MemberExpression {
                            object: Box::new(callee),
                            property: Box::new(property),
                            computed: false,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expression()?;
                    let end = self.expect(&TokenKind::RBracket)?.span;
                    let span = callee.span.merge(end);
                    callee = Node::new(
                        NodeKind::MemberExpression {
                            object: Box::new(callee),
                            property: Box::new(property),
                            computed: true,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        let (arguments, span) = if self.check(&TokenKind::LParen) {
            let (args, end) = self.parse_arguments()?;
            (args, start.merge(end))
        } else {
            (Vec::new(), start.merge(callee.span))
        };
        Some(Node::new(
            NodeKind::NewExpression {
                callee: Box::new(callee),
                arguments,
            },
            span,
        ))
    }

    /// `( arg, arg, ... )` — returns the arguments and the `)` span.
    fn parse_arguments(&mut self) -> Option<(Vec<Node>, Span)> {
        self.expect(&TokenKind::LParen)?;
        let mut arguments = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            arguments.push(self.parse_assignment()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RParen)?.span;
        Some((arguments, end))
    }

    fn parse_primary(&mut self) -> Option<Node> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Node::new(NodeKind::Identifier { name }, span))
            }
            TokenKind::Number(value) => {
                let span = self.advance().span;
                Some(literal(LiteralValue::Number(value), span))
            }
            TokenKind::Str(value) => {
                let span = self.advance().span;
                Some(literal(LiteralValue::Str(value), span))
            }
            TokenKind::True => {
                let span = self.advance().span;
                Some(literal(LiteralValue::Bool(true), span))
            }
            TokenKind::False => {
                let span = self.advance().span;
                Some(literal(LiteralValue::Bool(false), span))
            }
            TokenKind::Null => {
                let span = self.advance().span;
                Some(literal(LiteralValue::Null, span))
            }
            TokenKind::This => {
                let span = self.advance().span;
                Some(Node::new(NodeKind::ThisExpression, span))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                // The node keeps its own span; the parentheses carry no
                // cost and no injection position of their own.
                Some(expr)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::Function => self.parse_function_expression(),
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// `[a, , b]` — elisions become `None` elements.
    fn parse_array_literal(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::LBracket)?.span;
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.at_end() {
            if self.check(&TokenKind::Comma) {
                self.advance();
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_assignment()?));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBracket)?.span;
        Some(Node::new(
            NodeKind::ArrayExpression { elements },
            start.merge(end),
        ))
    }

    /// `{ key: value, "key": value, 1: value }`
    fn parse_object_literal(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::LBrace)?.span;
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let key = self.parse_property_key()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_assignment()?;
            let span = key.span.merge(value.span);
            properties.push(Node::new(
                NodeKind::Property {
                    key: Box::new(key),
                    value: Box::new(value),
                },
                span,
            ));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBrace)?.span;
        Some(Node::new(
            NodeKind::ObjectExpression { properties },
            start.merge(end),
        ))
    }

    fn parse_property_key(&mut self) -> Option<Node> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Node::new(NodeKind::Identifier { name }, span))
            }
            TokenKind::Str(value) => {
                let span = self.advance().span;
                Some(literal(LiteralValue::Str(value), span))
            }
            TokenKind::Number(value) => {
                let span = self.advance().span;
                Some(literal(LiteralValue::Number(value), span))
            }
            kind => {
                if let Some(word) = kind.keyword_name() {
                    let span = self.advance().span;
                    return Some(Node::new(
                        NodeKind::Identifier {
                            name: word.to_string(),
                        },
                        span,
                    ));
                }
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected property name, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// `function [*] [name] (params) { body }` in expression position.
    fn parse_function_expression(&mut self) -> Option<Node> {
        let start = self.expect(&TokenKind::Function)?.span;
        let generator = self.eat(&TokenKind::Star);
        let id = if matches!(self.peek_kind(), TokenKind::Identifier(_)) {
            Some(Box::new(self.expect_identifier()?))
        } else {
            None
        };
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Node::new(
            NodeKind::FunctionExpression {
                id,
                params,
                body: Box::new(body),
                generator,
            },
            span,
        ))
    }
}

fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    let span = left.span.merge(right.span);
    Node::new(
        NodeKind::BinaryExpression {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn logical(op: LogicalOp, left: Node, right: Node) -> Node {
    let span = left.span.merge(right.span);
    Node::new(
        NodeKind::LogicalExpression {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn literal(value: LiteralValue, span: Span) -> Node {
    Node::new(NodeKind::Literal { value }, span)
}
