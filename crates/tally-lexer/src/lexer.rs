//! Core lexer — converts contract source text to a token stream.
//!
//! Features:
//! - Byte-offset spans on every token (the injector splices by byte position)
//! - Single-line (`//`) and block (`/* */`) comments stripped
//! - String literals with the usual escapes, single or double quoted
//! - Decimal, fractional, exponent, and `0x` hex number forms
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use tally_types::{Diagnostics, ErrorCode, SourceFile, Span, TallyError};

use crate::token::{Token, TokenKind};

/// The lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`tally_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Collected errors.
    errors: Diagnostics,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: Diagnostics,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            errors: Diagnostics::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            if self.errors.at_capacity() {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        // Ensure the token stream always ends with Eof
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, Span::point(self.pos as u32)));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.errors
            .push_error(TallyError::new(code, message, span, self.source_file));
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(ch) = self.advance() {
                        if ch == b'*' && self.peek() == Some(b'/') {
                            self.advance();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        let span = self.span_from(start);
                        self.emit_error(
                            ErrorCode::UNTERMINATED_COMMENT,
                            "unterminated block comment",
                            span,
                        );
                    }
                }
                _ => break,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::point(start as u32));
        };

        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'?' => TokenKind::Question,
            b':' => TokenKind::Colon,

            b'=' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.eat(b'>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.eat(b'=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            b'+' => {
                if self.eat(b'+') {
                    TokenKind::PlusPlus
                } else if self.eat(b'=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    TokenKind::MinusMinus
                } else if self.eat(b'=') {
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.eat(b'=') {
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            b'/' => {
                if self.eat(b'=') {
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            b'%' => {
                if self.eat(b'=') {
                    TokenKind::PercentAssign
                } else {
                    TokenKind::Percent
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AmpAmp
                } else {
                    let span = self.span_from(start);
                    self.emit_error(
                        ErrorCode::INVALID_CHARACTER,
                        "bitwise '&' is not supported",
                        span,
                    );
                    return self.scan_token();
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::PipePipe
                } else {
                    let span = self.span_from(start);
                    self.emit_error(
                        ErrorCode::INVALID_CHARACTER,
                        "bitwise '|' is not supported",
                        span,
                    );
                    return self.scan_token();
                }
            }

            b'"' | b'\'' => return self.scan_string(start, ch),
            b'0'..=b'9' => return self.scan_number(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => return self.scan_identifier(start),

            other => {
                let span = self.span_from(start);
                self.emit_error(
                    ErrorCode::INVALID_CHARACTER,
                    format!("unexpected character '{}'", other as char),
                    span,
                );
                return self.scan_token();
            }
        };

        Token::new(kind, self.span_from(start))
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$' {
                self.advance();
            } else {
                break;
            }
        }
        let span = self.span_from(start);
        let word = &self.source_file.source[start..self.pos];
        let kind = TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Identifier(word.to_string()));
        Token::new(kind, span)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        // Hex: 0x...
        if self.source[start] == b'0' && matches!(self.peek(), Some(b'x') | Some(b'X')) {
            self.advance();
            let digits_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.advance();
            }
            let span = self.span_from(start);
            if self.pos == digits_start {
                self.emit_error(ErrorCode::INVALID_NUMBER, "missing hex digits", span);
                return Token::new(TokenKind::Number(0.0), span);
            }
            let digits = &self.source_file.source[digits_start..self.pos];
            let value = u64::from_str_radix(digits, 16).unwrap_or(0) as f64;
            return Token::new(TokenKind::Number(value), span);
        }

        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        // Fraction — only when a digit follows the dot, so `1.toString` lexes
        // as `1` `.` `toString`.
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        // Exponent
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let next = self.peek_at(1);
            let after_sign = self.peek_at(2);
            let has_exp = match next {
                Some(c) if c.is_ascii_digit() => true,
                Some(b'+') | Some(b'-') => matches!(after_sign, Some(c) if c.is_ascii_digit()),
                _ => false,
            };
            if has_exp {
                self.advance();
                if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                    self.advance();
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let span = self.span_from(start);
        let text = &self.source_file.source[start..self.pos];
        match text.parse::<f64>() {
            Ok(value) => Token::new(TokenKind::Number(value), span),
            Err(_) => {
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("invalid number literal '{text}'"),
                    span,
                );
                Token::new(TokenKind::Number(0.0), span)
            }
        }
    }

    fn scan_string(&mut self, start: usize, quote: u8) -> Token {
        // Accumulate raw bytes so multi-byte UTF-8 content survives intact.
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            match self.advance() {
                None | Some(b'\n') => {
                    let span = self.span_from(start);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    let value = String::from_utf8_lossy(&bytes).into_owned();
                    return Token::new(TokenKind::Str(value), span);
                }
                Some(ch) if ch == quote => break,
                Some(b'\\') => match self.advance() {
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(b'r') => bytes.push(b'\r'),
                    Some(b'b') => bytes.push(0x08),
                    Some(b'f') => bytes.push(0x0C),
                    Some(b'0') => bytes.push(0),
                    Some(b'\\') => bytes.push(b'\\'),
                    Some(b'\'') => bytes.push(b'\''),
                    Some(b'"') => bytes.push(b'"'),
                    Some(other) => bytes.push(other),
                    None => {}
                },
                Some(ch) => bytes.push(ch),
            }
        }
        let value = String::from_utf8_lossy(&bytes).into_owned();
        Token::new(TokenKind::Str(value), self.span_from(start))
    }
}
