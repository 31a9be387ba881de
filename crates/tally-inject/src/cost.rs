//! The instruction cost table.
//!
//! One fixed, published mapping from node kind to cost units. Downstream
//! tooling computes expected totals for known snippets from these exact
//! values, so the table is stable by contract: changing any entry is a
//! breaking change for every host that budgets against it.

use tally_types::ast::NodeKind;

/// Calls and construction dominate; they dispatch dynamically and may
/// allocate.
pub const CALL_COST: u64 = 8;
/// `throw` unwinds the stack.
pub const THROW_COST: u64 = 6;
/// Suspending and resuming a generator.
pub const YIELD_COST: u64 = 6;
/// Property lookup, object/array construction, meta-properties.
pub const ACCESS_COST: u64 = 4;
/// Plain operator evaluation.
pub const OPERATOR_COST: u64 = 3;

/// Cost units for a node kind; zero for kinds that carry no cost of
/// their own.
pub fn cost_of(kind: &NodeKind) -> u64 {
    match kind {
        NodeKind::CallExpression { .. } | NodeKind::NewExpression { .. } => CALL_COST,
        NodeKind::ThrowStatement { .. } => THROW_COST,
        NodeKind::YieldExpression { .. } => YIELD_COST,
        NodeKind::MemberExpression { .. }
        | NodeKind::MetaProperty { .. }
        | NodeKind::ObjectExpression { .. }
        | NodeKind::ArrayExpression { .. } => ACCESS_COST,
        NodeKind::AssignmentExpression { .. }
        | NodeKind::BinaryExpression { .. }
        | NodeKind::UpdateExpression { .. }
        | NodeKind::UnaryExpression { .. }
        | NodeKind::LogicalExpression { .. }
        | NodeKind::ConditionalExpression { .. } => OPERATOR_COST,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::ast::*;
    use tally_types::Span;

    fn node(kind: NodeKind) -> Node {
        Node::new(kind, Span::new(0, 1))
    }

    #[test]
    fn test_call_is_the_most_expensive() {
        let ident = || Box::new(node(NodeKind::Identifier { name: "x".into() }));
        let call = NodeKind::CallExpression {
            callee: ident(),
            arguments: vec![],
        };
        assert_eq!(cost_of(&call), CALL_COST);
        let member = NodeKind::MemberExpression {
            object: ident(),
            property: ident(),
            computed: false,
        };
        assert!(cost_of(&call) > cost_of(&member));
        assert!(cost_of(&member) > OPERATOR_COST);
    }

    #[test]
    fn test_statements_and_leaves_are_free() {
        assert_eq!(cost_of(&NodeKind::EmptyStatement), 0);
        assert_eq!(cost_of(&NodeKind::ThisExpression), 0);
        assert_eq!(
            cost_of(&NodeKind::Identifier { name: "x".into() }),
            0
        );
        assert_eq!(
            cost_of(&NodeKind::Literal {
                value: LiteralValue::Number(1.0)
            }),
            0
        );
    }

    #[test]
    fn test_throw_carries_its_own_cost() {
        let throw = NodeKind::ThrowStatement {
            argument: Box::new(node(NodeKind::Identifier { name: "e".into() })),
        };
        assert_eq!(cost_of(&throw), THROW_COST);
    }
}
