//! Generic depth-first tree walk with ancestor-path and context threading.
//!
//! The walk is pre-order and read-only. Each visited node sees the chain of
//! `(owner, field)` pairs it was reached through, plus an optional context
//! value inherited from an ancestor. A visitor can hand specific child fields
//! a fresh context; that context then becomes the inherited one for the whole
//! subtree under the matching child.

use tally_types::ast::Node;

/// One step in the ancestor chain: which field of which owner led here.
///
/// Array-valued fields repeat the same field name per element; indices are
/// never part of the path.
pub struct PathEntry<'a> {
    pub owner: &'a Node,
    pub field: &'static str,
}

/// What to do after visiting a node.
pub enum Visit<C> {
    /// Do not descend into this node's children.
    Skip,
    /// Descend; children inherit the current context.
    Descend,
    /// Descend; children whose field name appears in the list receive the
    /// paired context instead of the inherited one.
    DescendWith(Vec<(&'static str, C)>),
}

pub trait Visitor {
    type Ctx: Clone;

    fn enter(
        &mut self,
        node: &Node,
        path: &[PathEntry<'_>],
        ctx: Option<&Self::Ctx>,
    ) -> Visit<Self::Ctx>;
}

/// Walk `root` depth-first in pre-order, threading path and context.
pub fn traverse<V: Visitor>(root: &Node, visitor: &mut V) {
    let mut path = Vec::new();
    walk(root, &mut path, None, visitor);
}

fn walk<'a, V: Visitor>(
    node: &'a Node,
    path: &mut Vec<PathEntry<'a>>,
    ctx: Option<&V::Ctx>,
    visitor: &mut V,
) {
    let overrides = match visitor.enter(node, path, ctx) {
        Visit::Skip => return,
        Visit::Descend => Vec::new(),
        Visit::DescendWith(overrides) => overrides,
    };
    for (field, child) in node.children() {
        let child_ctx = overrides
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
            .or(ctx);
        path.push(PathEntry { owner: node, field });
        walk(child, path, child_ctx, visitor);
        path.pop();
    }
}
