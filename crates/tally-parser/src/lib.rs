//! Tally parser: converts a token stream into a range-annotated AST.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};

use tally_lexer::Lexer;
use tally_types::SourceFile;

/// Lex and parse a source file in one step.
///
/// Lexer diagnostics come first in the combined error list.
pub fn parse_source(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    if lexed.errors.has_errors() {
        let mut errors = lexed.errors;
        for e in result.errors.errors {
            errors.push_error(e);
        }
        result.errors = errors;
        result.program = None;
    }
    result
}
