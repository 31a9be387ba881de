//! The redefinition guard: contracts must not shadow or reassign the
//! counter binding, or they could disable their own metering.

use tally_types::ast::{LiteralValue, Node, NodeKind};
use tally_types::{ErrorCode, SourceFile, TallyError, COUNTER_NAME};

/// Scan the tree before instrumentation; the first violation aborts the
/// whole transform.
///
/// Lenient mode rejects the reserved name only in declaration positions
/// (variable declarator ids, function names, parameters, destructuring
/// elements).
/// Strict mode rejects any identifier or string literal spelling it.
pub(crate) fn check(
    program: &Node,
    source_file: &SourceFile,
    strict: bool,
) -> Result<(), TallyError> {
    match find_violation(program, None, strict) {
        Some(node) => {
            let (code, message) = if strict {
                (
                    ErrorCode::COUNTER_REFERENCED,
                    format!("redefine or use `{COUNTER_NAME}` not allowed"),
                )
            } else {
                (
                    ErrorCode::COUNTER_REDEFINED,
                    format!("redefine `{COUNTER_NAME}` is not allowed"),
                )
            };
            Err(TallyError::new(code, message, node.span, source_file))
        }
        None => Ok(()),
    }
}

/// Depth-first search for the first offending node, threading the
/// `(owner, field)` the node was reached through so declaration positions
/// can be recognized.
fn find_violation<'a>(
    node: &'a Node,
    via: Option<(&'a Node, &'static str)>,
    strict: bool,
) -> Option<&'a Node> {
    if names_counter(node) && (strict || is_declaration_position(via)) {
        return Some(node);
    }
    node.children()
        .into_iter()
        .find_map(|(field, child)| find_violation(child, Some((node, field)), strict))
}

fn names_counter(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Identifier { name } => name == COUNTER_NAME,
        NodeKind::Literal {
            value: LiteralValue::Str(s),
        } => s == COUNTER_NAME,
        _ => false,
    }
}

fn is_declaration_position(via: Option<(&Node, &'static str)>) -> bool {
    let Some((owner, field)) = via else {
        return false;
    };
    match &owner.kind {
        NodeKind::VariableDeclarator { .. } => field == "id",
        // A parameter shadows the counter for the whole body, which would
        // route every injected incr to a caller-supplied object.
        NodeKind::FunctionDeclaration { .. } | NodeKind::FunctionExpression { .. } => {
            field == "id" || field == "params"
        }
        NodeKind::ArrowFunctionExpression { .. } => field == "params",
        NodeKind::ArrayPattern { .. } => field == "elements",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_parser::parse_source;

    fn guard(source: &str, strict: bool) -> Result<(), TallyError> {
        let sf = SourceFile::new("guard.js", source);
        let program = parse_source(&sf).program.expect("parse failed");
        check(&program, &sf, strict)
    }

    #[test]
    fn test_lenient_rejects_var_declaration() {
        let err = guard("var _instruction_counter = 1;", false).unwrap_err();
        assert_eq!(err.message, "redefine `_instruction_counter` is not allowed");
        assert_eq!(err.code, ErrorCode::COUNTER_REDEFINED);
    }

    #[test]
    fn test_lenient_rejects_function_name() {
        assert!(guard("function _instruction_counter() {}", false).is_err());
        assert!(guard("var f = function _instruction_counter() {};", false).is_err());
    }

    #[test]
    fn test_lenient_rejects_function_parameter() {
        assert!(guard("function f(_instruction_counter) { g(); }", false).is_err());
        assert!(guard("var f = function (a, _instruction_counter) {};", false).is_err());
    }

    #[test]
    fn test_lenient_rejects_arrow_parameter() {
        assert!(guard("var f = _instruction_counter => 1;", false).is_err());
        assert!(guard("var f = (a, _instruction_counter) => { return a; };", false).is_err());
    }

    #[test]
    fn test_lenient_rejects_destructuring_element() {
        assert!(guard("var [a, _instruction_counter] = pair;", false).is_err());
    }

    #[test]
    fn test_lenient_allows_plain_reference() {
        assert!(guard("var x = _instruction_counter.count;", false).is_ok());
    }

    #[test]
    fn test_strict_rejects_any_reference() {
        let err = guard("var x = _instruction_counter.count;", true).unwrap_err();
        assert_eq!(
            err.message,
            "redefine or use `_instruction_counter` not allowed"
        );
        assert_eq!(err.code, ErrorCode::COUNTER_REFERENCED);
    }

    #[test]
    fn test_strict_rejects_string_literal_spelling() {
        assert!(guard("var x = this['_instruction_counter'];", true).is_err());
        assert!(guard("var x = '_instruction_counter';", true).is_err());
    }

    #[test]
    fn test_strict_allows_unrelated_code() {
        assert!(guard("var counter = 0; counter += 1;", true).is_ok());
    }

    #[test]
    fn test_other_strings_pass_both_modes() {
        assert!(guard("var x = 'instruction counter';", true).is_ok());
        assert!(guard("var x = 'instruction counter';", false).is_ok());
    }
}
