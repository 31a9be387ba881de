//! Core parser infrastructure: token cursor, error reporting, helpers.

use tally_lexer::token::{Token, TokenKind};
use tally_types::ast::Node;
use tally_types::{Diagnostics, ErrorCode, SourceFile, Span, TallyError};

/// The parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery at statement boundaries.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: Diagnostics,
    /// Current expression nesting depth (capped).
    pub(crate) expr_depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Option<Node>,
    pub errors: Diagnostics,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Diagnostics::empty(),
            expr_depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(0)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Index of the current token in the stream.
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Scan forward from an opening `(` at the current position to find the
    /// token index just past its matching `)`. Used for arrow-function
    /// lookahead. Returns `None` when the parenthesis never closes.
    pub(crate) fn matching_paren_end(&self) -> Option<usize> {
        debug_assert!(matches!(self.peek_kind(), TokenKind::LParen));
        let mut depth = 0usize;
        let mut i = self.pos;
        while let Some(token) = self.tokens.get(i) {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
            i += 1;
        }
        None
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits
    /// an error and returns `None`.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect an identifier token. Returns an Identifier node.
    pub(crate) fn expect_identifier(&mut self) -> Option<Node> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Node::new(tally_types::ast::NodeKind::Identifier { name }, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Expect an identifier OR a keyword used as a member name after `.`
    /// (e.g. `obj.delete()`).
    pub(crate) fn expect_member_name(&mut self) -> Option<Node> {
        let kind = self.peek_kind().clone();
        match &kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Some(Node::new(tally_types::ast::NodeKind::Identifier { name }, span))
            }
            _ => match kind.keyword_name() {
                Some(kw) => {
                    let span = self.advance().span;
                    Some(Node::new(
                        tally_types::ast::NodeKind::Identifier {
                            name: kw.to_string(),
                        },
                        span,
                    ))
                }
                None => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("expected property name, got '{}'", self.peek_kind()),
                    );
                    None
                }
            },
        }
    }

    /// Expect a statement-terminating semicolon.
    ///
    /// A closing `}` or end of input is accepted in its place (but not
    /// consumed); full newline-driven automatic semicolon insertion is out of
    /// subset. Returns the span up to which the statement extends.
    pub(crate) fn expect_semicolon(&mut self) -> Span {
        if self.check(&TokenKind::Semicolon) {
            self.advance().span
        } else if self.check(&TokenKind::RBrace) || self.at_end() {
            self.previous_span()
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected ';', got '{}'", self.peek_kind()),
            );
            self.previous_span()
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.errors
            .push_error(TallyError::new(code, message, span, self.source_file));
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.at_capacity()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until we reach a synchronization point.
    /// Used after an error to resume at a known-good position.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.eat(&TokenKind::Semicolon) {
                return;
            }
            match self.peek_kind() {
                TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::With
                | TokenKind::Switch
                | TokenKind::Throw
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program,
            errors: self.errors,
        }
    }
}
