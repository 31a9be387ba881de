//! Lexer tests: token kinds, spans, comments, strings, numbers, errors.

use tally_lexer::{Lexer, TokenKind};
use tally_types::{SourceFile, Span};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source and return the token kinds, excluding the trailing Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.js", source);
    let result = Lexer::new(&sf).lex();
    assert!(
        !result.errors.has_errors(),
        "unexpected lex errors: {:?}",
        result.errors.errors
    );
    let mut out: Vec<TokenKind> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(out.pop(), Some(TokenKind::Eof));
    out
}

/// Lex source and return the error count.
fn error_count(source: &str) -> usize {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf).lex().errors.total_errors
}

// ─────────────────────────────────────────────────────────────────────
// Basics
// ─────────────────────────────────────────────────────────────────────

#[test]
fn empty_source_is_just_eof() {
    let sf = SourceFile::new("test.js", "");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("var x = null;"),
        vec![
            TokenKind::Var,
            TokenKind::Identifier("x".into()),
            TokenKind::Assign,
            TokenKind::Null,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn reserved_counter_name_is_a_plain_identifier() {
    assert_eq!(
        kinds("_instruction_counter"),
        vec![TokenKind::Identifier("_instruction_counter".into())]
    );
}

#[test]
fn dollar_and_underscore_identifiers() {
    assert_eq!(
        kinds("$a _b a$9"),
        vec![
            TokenKind::Identifier("$a".into()),
            TokenKind::Identifier("_b".into()),
            TokenKind::Identifier("a$9".into()),
        ]
    );
}

#[test]
fn token_spans_are_byte_offsets() {
    let sf = SourceFile::new("test.js", "var abc = 12;");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens[0].span, Span::new(0, 3)); // var
    assert_eq!(result.tokens[1].span, Span::new(4, 7)); // abc
    assert_eq!(result.tokens[2].span, Span::new(8, 9)); // =
    assert_eq!(result.tokens[3].span, Span::new(10, 12)); // 12
    assert_eq!(result.tokens[4].span, Span::new(12, 13)); // ;
}

// ─────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn operator_maximal_munch() {
    assert_eq!(
        kinds("=== == = !== != ! <= < >= >"),
        vec![
            TokenKind::EqEqEq,
            TokenKind::EqEq,
            TokenKind::Assign,
            TokenKind::NotEqEq,
            TokenKind::NotEq,
            TokenKind::Bang,
            TokenKind::LessEq,
            TokenKind::Less,
            TokenKind::GreaterEq,
            TokenKind::Greater,
        ]
    );
}

#[test]
fn compound_assignment_and_update() {
    assert_eq!(
        kinds("+= -= *= /= %= ++ --"),
        vec![
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::PercentAssign,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
        ]
    );
}

#[test]
fn logical_and_arrow() {
    assert_eq!(
        kinds("&& || =>"),
        vec![TokenKind::AmpAmp, TokenKind::PipePipe, TokenKind::Arrow]
    );
}

#[test]
fn lone_ampersand_is_an_error() {
    assert_eq!(error_count("a & b"), 1);
    assert_eq!(error_count("a | b"), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn number_forms() {
    assert_eq!(
        kinds("0 42 3.25 1e3 2.5e-2 0xff"),
        vec![
            TokenKind::Number(0.0),
            TokenKind::Number(42.0),
            TokenKind::Number(3.25),
            TokenKind::Number(1000.0),
            TokenKind::Number(0.025),
            TokenKind::Number(255.0),
        ]
    );
}

#[test]
fn dot_after_number_is_member_access() {
    assert_eq!(
        kinds("1.toString"),
        vec![
            TokenKind::Number(1.0),
            TokenKind::Dot,
            TokenKind::Identifier("toString".into()),
        ]
    );
}

#[test]
fn hex_without_digits_is_an_error() {
    assert_eq!(error_count("0x"), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Strings
// ─────────────────────────────────────────────────────────────────────

#[test]
fn string_quoting_and_escapes() {
    assert_eq!(
        kinds(r#""hello" 'world' "a\nb" 'it\'s'"#),
        vec![
            TokenKind::Str("hello".into()),
            TokenKind::Str("world".into()),
            TokenKind::Str("a\nb".into()),
            TokenKind::Str("it's".into()),
        ]
    );
}

#[test]
fn unterminated_string_is_an_error() {
    assert_eq!(error_count("\"abc"), 1);
    assert_eq!(error_count("\"abc\ndef\""), 2); // second line opens a new unterminated string
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn comments_are_stripped() {
    assert_eq!(
        kinds("a // line comment\n/* block\ncomment */ b"),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::Identifier("b".into()),
        ]
    );
}

#[test]
fn unterminated_block_comment_is_an_error() {
    assert_eq!(error_count("a /* never closed"), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn lexing_is_deterministic() {
    let source = "function f(x) { for (var i = 0; i < x; i++) { x += i; } return x; }";
    let first = kinds(source);
    for _ in 0..10 {
        assert_eq!(first, kinds(source));
    }
}
