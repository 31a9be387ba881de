//! The injection planner: per-node-kind policy deciding where and how each
//! cost contribution lands.
//!
//! The planner walks the tree once. Control-flow statements hand bespoke
//! contexts to their named children (a loop test becomes an inline wrapper,
//! a loop body is forced into a block); every other cost-bearing node bills
//! its cost either through the context it inherited or at the start of the
//! nearest enclosing statement that can host an increment. A node with cost
//! and no resolvable position is skipped, not an error: partial metering
//! beats no metering.

use tally_types::ast::{Node, NodeKind};
use tally_types::Span;

use crate::cost::cost_of;
use crate::record::{GeneratorKind, RecordStore};
use crate::walker::{traverse, PathEntry, Visit, Visitor};

/// Where and how a parent wants a child subtree's cost emitted.
#[derive(Debug, Clone, Copy)]
pub(crate) enum InjectionContext {
    /// A plain increment immediately before the target.
    BeforeNode { pos: u32 },
    /// A plain increment just inside the target block's opening brace.
    AtBeginning { pos: u32 },
    /// Wrap the target as `incr(N)&&( ... )`.
    InnerBeginning { start: u32, end: u32 },
    /// Wrap the target as `!incr(N)||( ... )`; used where an AND-rooted
    /// wrapper would flip short-circuit semantics (ternary positions).
    InnerBeginningNotAndOr { start: u32, end: u32 },
    /// Merge into the synthetic `{incr(N);return ...;}` of an arrow
    /// expression body.
    ReturnBeginning { pos: u32 },
}

/// Walk `program` and accumulate every planned injection.
pub(crate) fn plan(program: &Node) -> RecordStore {
    let mut planner = Planner {
        store: RecordStore::new(),
    };
    traverse(program, &mut planner);
    planner.store
}

struct Planner {
    store: RecordStore,
}

impl Planner {
    /// Emit `value` through a resolved context.
    fn apply(&mut self, ctx: InjectionContext, value: u64) {
        match ctx {
            InjectionContext::BeforeNode { pos } | InjectionContext::AtBeginning { pos } => {
                self.store.record(pos, GeneratorKind::Incr, value);
            }
            InjectionContext::InnerBeginning { start, end } => {
                self.store.record(start, GeneratorKind::InlineAnd, value);
                self.store
                    .record_close(end, GeneratorKind::CloseParen, start, 0);
            }
            InjectionContext::InnerBeginningNotAndOr { start, end } => {
                self.store.record(start, GeneratorKind::InlineOr, value);
                self.store
                    .record_close(end, GeneratorKind::CloseParen, start, 0);
            }
            InjectionContext::ReturnBeginning { pos } => {
                self.store.record(pos, GeneratorKind::ReturnOpen, value);
            }
        }
    }

    /// Bill a node's own cost, if any.
    fn bill(&mut self, node: &Node, path: &[PathEntry<'_>], ctx: Option<&InjectionContext>) {
        let value = cost_of(&node.kind);
        if value == 0 {
            return;
        }
        if let Some(ctx) = ctx {
            self.apply(*ctx, value);
            return;
        }
        if let Some(span) = nearest_injection_point(node, path) {
            self.store.record(span.start, GeneratorKind::Incr, value);
        }
        // No injectable ancestor: skip this node's cost.
    }

    /// Force a non-block statement into `{ ... }` so it can host increments.
    fn ensure_block(&mut self, stmt: &Node) {
        if !stmt.is_block() {
            self.store
                .record(stmt.span.start, GeneratorKind::BlockOpen, 0);
            self.store.record_close(
                stmt.span.end,
                GeneratorKind::BlockClose,
                stmt.span.start,
                0,
            );
        }
    }

    /// The fixed extra unit charged per for-in/for-of iteration, placed at
    /// the body's entry: inside the brace for real blocks, in the closing
    /// record for blocks the planner just forced.
    fn charge_iteration_unit(&mut self, body: &Node) {
        if body.is_block() {
            self.store
                .record(body.span.start + 1, GeneratorKind::Incr, 1);
        } else {
            self.store.record_close(
                body.span.end,
                GeneratorKind::BlockClose,
                body.span.start,
                1,
            );
        }
    }
}

/// Start of the nearest enclosing statement that can host an increment,
/// checking the node itself first (a throw statement is its own injection
/// point).
fn nearest_injection_point(node: &Node, path: &[PathEntry<'_>]) -> Option<Span> {
    if node.is_injectable_statement() {
        return Some(node.span);
    }
    path.iter()
        .rev()
        .find(|entry| entry.owner.is_injectable_statement())
        .map(|entry| entry.owner.span)
}

fn inner(node: &Node) -> InjectionContext {
    InjectionContext::InnerBeginning {
        start: node.span.start,
        end: node.span.end,
    }
}

fn inner_not_and_or(node: &Node) -> InjectionContext {
    InjectionContext::InnerBeginningNotAndOr {
        start: node.span.start,
        end: node.span.end,
    }
}

impl Visitor for Planner {
    type Ctx = InjectionContext;

    fn enter(
        &mut self,
        node: &Node,
        path: &[PathEntry<'_>],
        ctx: Option<&InjectionContext>,
    ) -> Visit<InjectionContext> {
        self.bill(node, path, ctx);

        match &node.kind {
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.ensure_block(consequent);
                if let Some(alternate) = alternate {
                    self.ensure_block(alternate);
                }
                Visit::DescendWith(vec![("test", inner(test))])
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.ensure_block(body);
                let mut ctxs = Vec::new();
                if init.is_some() {
                    ctxs.push((
                        "init",
                        InjectionContext::BeforeNode {
                            pos: node.span.start,
                        },
                    ));
                }
                if let Some(test) = test {
                    ctxs.push(("test", inner(test)));
                }
                if let Some(update) = update {
                    ctxs.push(("update", inner(update)));
                }
                Visit::DescendWith(ctxs)
            }
            NodeKind::ForInStatement { body, .. } | NodeKind::ForOfStatement { body, .. } => {
                self.ensure_block(body);
                self.charge_iteration_unit(body);
                Visit::DescendWith(vec![(
                    "right",
                    InjectionContext::BeforeNode {
                        pos: node.span.start,
                    },
                )])
            }
            NodeKind::WhileStatement { test, body } | NodeKind::DoWhileStatement { body, test } => {
                self.ensure_block(body);
                Visit::DescendWith(vec![("test", inner(test))])
            }
            NodeKind::WithStatement { body, .. } => {
                self.ensure_block(body);
                Visit::DescendWith(vec![(
                    "object",
                    InjectionContext::BeforeNode {
                        pos: node.span.start,
                    },
                )])
            }
            NodeKind::SwitchStatement { cases, .. } => {
                // Each case that executes at least one statement pays one
                // unit on entry; empty fallthrough cases pay nothing.
                for case in cases {
                    if let NodeKind::SwitchCase { consequent, .. } = &case.kind {
                        if let Some(first) = consequent.first() {
                            self.store
                                .record(first.span.start, GeneratorKind::Incr, 1);
                        }
                    }
                }
                Visit::DescendWith(vec![(
                    "discriminant",
                    InjectionContext::BeforeNode {
                        pos: node.span.start,
                    },
                )])
            }
            NodeKind::ArrowFunctionExpression {
                body,
                expression: true,
                ..
            } => {
                // A bare expression body cannot host a statement; rewrite it
                // into `{incr(N);return <expr>;}` unconditionally.
                self.store
                    .record(body.span.start, GeneratorKind::ReturnOpen, 0);
                self.store.record_close(
                    body.span.end,
                    GeneratorKind::ReturnClose,
                    body.span.start,
                    0,
                );
                Visit::DescendWith(vec![(
                    "body",
                    InjectionContext::ReturnBeginning {
                        pos: body.span.start,
                    },
                )])
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => Visit::DescendWith(vec![
                ("test", inner_not_and_or(test)),
                ("consequent", inner_not_and_or(consequent)),
                ("alternate", inner_not_and_or(alternate)),
            ]),
            _ => Visit::Descend,
        }
    }
}
