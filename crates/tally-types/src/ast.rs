//! AST node types for the supported ECMAScript subset.
//!
//! The tree is deliberately uniform — a single [`Node`] struct with a tagged
//! [`NodeKind`] — so the injector's generic walker can thread paths and
//! injection contexts through arbitrary nodes without caring which statement
//! or expression family a child belongs to. Every node carries a byte-offset
//! [`Span`]; a child's span is always contained within its parent's.
//!
//! Child field names ([`Node::children`]) follow the conventional grammar
//! names (`test`, `consequent`, `alternate`, `body`, `discriminant`, ...)
//! because the walker's per-child context maps are keyed by them.

use crate::Span;

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` for `{ ... }` statement blocks.
    pub fn is_block(&self) -> bool {
        matches!(self.kind, NodeKind::BlockStatement { .. })
    }

    /// Returns `true` for node kinds that can host a standalone
    /// instrumentation statement directly in front of them.
    pub fn is_injectable_statement(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::ExpressionStatement { .. }
                | NodeKind::VariableDeclaration { .. }
                | NodeKind::ReturnStatement { .. }
                | NodeKind::ThrowStatement { .. }
        )
    }
}

/// The kind of a syntax node.
///
/// Large recursive variants are boxed to keep the enum size reasonable.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A whole script: a list of top-level statements.
    Program { body: Vec<Node> },

    // ── Statements ──
    /// `{ stmts... }`
    BlockStatement { body: Vec<Node> },
    /// `expr;`
    ExpressionStatement { expression: Box<Node> },
    /// `var|let|const declarators;`
    VariableDeclaration {
        decl_kind: DeclKind,
        declarations: Vec<Node>,
    },
    /// One `id = init` (or bare `id`) inside a variable declaration.
    VariableDeclarator {
        id: Box<Node>,
        init: Option<Box<Node>>,
    },
    /// `function name(params) { body }` (optionally `function*`).
    FunctionDeclaration {
        id: Box<Node>,
        params: Vec<Node>,
        body: Box<Node>,
        generator: bool,
    },
    /// `return expr?;`
    ReturnStatement { argument: Option<Box<Node>> },
    /// `if (test) consequent [else alternate]`
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
    },
    /// `for (init?; test?; update?) body`
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    /// `for (left in right) body`
    ForInStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    /// `for (left of right) body`
    ForOfStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    /// `while (test) body`
    WhileStatement { test: Box<Node>, body: Box<Node> },
    /// `do body while (test);`
    DoWhileStatement { body: Box<Node>, test: Box<Node> },
    /// `with (object) body`
    WithStatement { object: Box<Node>, body: Box<Node> },
    /// `switch (discriminant) { cases... }`
    SwitchStatement {
        discriminant: Box<Node>,
        cases: Vec<Node>,
    },
    /// `case test: stmts...` / `default: stmts...`
    SwitchCase {
        test: Option<Box<Node>>,
        consequent: Vec<Node>,
    },
    /// `throw expr;`
    ThrowStatement { argument: Box<Node> },
    /// `break;`
    BreakStatement,
    /// `continue;`
    ContinueStatement,
    /// `;`
    EmptyStatement,

    // ── Expressions ──
    /// A name reference or binding.
    Identifier { name: String },
    /// A literal token: number, string, boolean, or `null`.
    Literal { value: LiteralValue },
    /// `this`
    ThisExpression,
    /// `[elements...]` — elisions (`[,]`) are `None`.
    ArrayExpression { elements: Vec<Option<Node>> },
    /// `{ properties... }`
    ObjectExpression { properties: Vec<Node> },
    /// One `key: value` entry in an object literal.
    Property { key: Box<Node>, value: Box<Node> },
    /// `function name?(params) { body }` in expression position.
    FunctionExpression {
        id: Option<Box<Node>>,
        params: Vec<Node>,
        body: Box<Node>,
        generator: bool,
    },
    /// `(params) => body` — `expression` is `true` when the body is a bare
    /// expression rather than a block.
    ArrowFunctionExpression {
        params: Vec<Node>,
        body: Box<Node>,
        expression: bool,
    },
    /// `object.property` / `object[property]`
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    /// `callee(arguments...)`
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    /// `new callee(arguments...)`
    NewExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    /// `new.target`
    MetaProperty { meta: Box<Node>, property: Box<Node> },
    /// `op argument` (`!`, `-`, `+`, `typeof`, `void`, `delete`)
    UnaryExpression { op: UnaryOp, argument: Box<Node> },
    /// `++x`, `x--`, ...
    UpdateExpression {
        op: UpdateOp,
        argument: Box<Node>,
        prefix: bool,
    },
    /// `left op right` for arithmetic/comparison operators.
    BinaryExpression {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `left && right` / `left || right`
    LogicalExpression {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `target op= value`
    AssignmentExpression {
        op: AssignOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `test ? consequent : alternate`
    ConditionalExpression {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    /// `yield expr?` / `yield* expr`
    YieldExpression {
        argument: Option<Box<Node>>,
        delegate: bool,
    },
    /// `[targets...] = ...` binding pattern — elisions are `None`.
    ArrayPattern { elements: Vec<Option<Node>> },
}

impl NodeKind {
    /// The conventional grammar type tag for this node kind.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::WithStatement { .. } => "WithStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::ArrowFunctionExpression { .. } => "ArrowFunctionExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::MetaProperty { .. } => "MetaProperty",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::YieldExpression { .. } => "YieldExpression",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
        }
    }
}

impl Node {
    /// Enumerate `(field-name, child)` pairs in source order.
    ///
    /// Array-valued fields are flattened into repeated pairs with the same
    /// field name — array indices are not meaningful ancestors and never
    /// appear in a walker path.
    pub fn children(&self) -> Vec<(&'static str, &Node)> {
        let mut out: Vec<(&'static str, &Node)> = Vec::new();
        match &self.kind {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => {
                for s in body {
                    out.push(("body", s));
                }
            }
            NodeKind::ExpressionStatement { expression } => {
                out.push(("expression", expression));
            }
            NodeKind::VariableDeclaration { declarations, .. } => {
                for d in declarations {
                    out.push(("declarations", d));
                }
            }
            NodeKind::VariableDeclarator { id, init } => {
                out.push(("id", id));
                if let Some(init) = init {
                    out.push(("init", init));
                }
            }
            NodeKind::FunctionDeclaration {
                id, params, body, ..
            } => {
                out.push(("id", id));
                for p in params {
                    out.push(("params", p));
                }
                out.push(("body", body));
            }
            NodeKind::ReturnStatement { argument } => {
                if let Some(a) = argument {
                    out.push(("argument", a));
                }
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                out.push(("test", test));
                out.push(("consequent", consequent));
                if let Some(a) = alternate {
                    out.push(("alternate", a));
                }
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                if let Some(i) = init {
                    out.push(("init", i));
                }
                if let Some(t) = test {
                    out.push(("test", t));
                }
                if let Some(u) = update {
                    out.push(("update", u));
                }
                out.push(("body", body));
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::ForOfStatement { left, right, body } => {
                out.push(("left", left));
                out.push(("right", right));
                out.push(("body", body));
            }
            NodeKind::WhileStatement { test, body } => {
                out.push(("test", test));
                out.push(("body", body));
            }
            NodeKind::DoWhileStatement { body, test } => {
                out.push(("body", body));
                out.push(("test", test));
            }
            NodeKind::WithStatement { object, body } => {
                out.push(("object", object));
                out.push(("body", body));
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                out.push(("discriminant", discriminant));
                for c in cases {
                    out.push(("cases", c));
                }
            }
            NodeKind::SwitchCase { test, consequent } => {
                if let Some(t) = test {
                    out.push(("test", t));
                }
                for s in consequent {
                    out.push(("consequent", s));
                }
            }
            NodeKind::ThrowStatement { argument } => {
                out.push(("argument", argument));
            }
            NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::EmptyStatement
            | NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::ThisExpression => {}
            NodeKind::ArrayExpression { elements } => {
                for e in elements.iter().flatten() {
                    out.push(("elements", e));
                }
            }
            NodeKind::ObjectExpression { properties } => {
                for p in properties {
                    out.push(("properties", p));
                }
            }
            NodeKind::Property { key, value } => {
                out.push(("key", key));
                out.push(("value", value));
            }
            NodeKind::FunctionExpression {
                id, params, body, ..
            } => {
                if let Some(id) = id {
                    out.push(("id", id));
                }
                for p in params {
                    out.push(("params", p));
                }
                out.push(("body", body));
            }
            NodeKind::ArrowFunctionExpression { params, body, .. } => {
                for p in params {
                    out.push(("params", p));
                }
                out.push(("body", body));
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                out.push(("object", object));
                out.push(("property", property));
            }
            NodeKind::CallExpression { callee, arguments }
            | NodeKind::NewExpression { callee, arguments } => {
                out.push(("callee", callee));
                for a in arguments {
                    out.push(("arguments", a));
                }
            }
            NodeKind::MetaProperty { meta, property } => {
                out.push(("meta", meta));
                out.push(("property", property));
            }
            NodeKind::UnaryExpression { argument, .. } => {
                out.push(("argument", argument));
            }
            NodeKind::UpdateExpression { argument, .. } => {
                out.push(("argument", argument));
            }
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. } => {
                out.push(("left", left));
                out.push(("right", right));
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                out.push(("test", test));
                out.push(("consequent", consequent));
                out.push(("alternate", alternate));
            }
            NodeKind::YieldExpression { argument, .. } => {
                if let Some(a) = argument {
                    out.push(("argument", a));
                }
            }
            NodeKind::ArrayPattern { elements } => {
                for e in elements.iter().flatten() {
                    out.push(("elements", e));
                }
            }
        }
        out
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// `var` / `let` / `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

/// `++` / `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Incr,
    Decr,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Incr => "++",
            UpdateOp::Decr => "--",
        }
    }
}

/// Binary (non-logical) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEq => "<=",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// `&&` / `||`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: u32, end: u32) -> Node {
        Node::new(
            NodeKind::Identifier {
                name: name.to_string(),
            },
            Span::new(start, end),
        )
    }

    #[test]
    fn test_children_if_statement() {
        let node = Node::new(
            NodeKind::IfStatement {
                test: Box::new(ident("a", 4, 5)),
                consequent: Box::new(Node::new(
                    NodeKind::BlockStatement { body: vec![] },
                    Span::new(7, 9),
                )),
                alternate: None,
            },
            Span::new(0, 9),
        );
        let kids = node.children();
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].0, "test");
        assert_eq!(kids[1].0, "consequent");
    }

    #[test]
    fn test_children_flatten_arrays() {
        let node = Node::new(
            NodeKind::BlockStatement {
                body: vec![
                    Node::new(NodeKind::EmptyStatement, Span::new(1, 2)),
                    Node::new(NodeKind::EmptyStatement, Span::new(2, 3)),
                ],
            },
            Span::new(0, 4),
        );
        let kids = node.children();
        assert_eq!(kids.len(), 2);
        assert!(kids.iter().all(|(f, _)| *f == "body"));
    }

    #[test]
    fn test_injectable_statement_kinds() {
        let ret = Node::new(NodeKind::ReturnStatement { argument: None }, Span::new(0, 7));
        assert!(ret.is_injectable_statement());
        let blk = Node::new(NodeKind::BlockStatement { body: vec![] }, Span::new(0, 2));
        assert!(!blk.is_injectable_statement());
        assert!(blk.is_block());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(
            NodeKind::ConditionalExpression {
                test: Box::new(ident("a", 0, 1)),
                consequent: Box::new(ident("b", 2, 3)),
                alternate: Box::new(ident("c", 4, 5)),
            }
            .name(),
            "ConditionalExpression"
        );
        assert_eq!(NodeKind::EmptyStatement.name(), "EmptyStatement");
    }
}
