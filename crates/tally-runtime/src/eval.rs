//! Tree-walking evaluator for instrumented sources.
//!
//! The sandbox binds a live [`InstructionCounter`] under the reserved name
//! so that instrumented programs meter themselves as they run. The counter
//! binding is tamper-resistant: assigning to or deleting its members is a
//! silent no-op, and `incr` rejects negative arguments while still
//! returning `true` so inline `&&`/`||` wrappers keep the guarded
//! expression's control flow intact.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tally_parser::parse_source;
use tally_types::ast::{
    AssignOp, BinaryOp, LiteralValue, LogicalOp, Node, NodeKind, UnaryOp, UpdateOp,
};
use tally_types::{SourceFile, COUNTER_NAME};

use crate::counter::InstructionCounter;
use crate::env::Environment;
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::{FunctionValue, Value};

/// An isolated evaluator with its own global scope and instruction counter.
pub struct Sandbox {
    env: Environment,
    counter: Rc<RefCell<InstructionCounter>>,
    budget: Option<u64>,
}

impl Sandbox {
    pub fn new() -> Self {
        let counter = Rc::new(RefCell::new(InstructionCounter::default()));
        let mut env = Environment::new();
        env.define(COUNTER_NAME, Value::Counter(Rc::clone(&counter)));
        env.define("undefined", Value::Undefined);
        Sandbox {
            env,
            counter,
            budget: None,
        }
    }

    /// Aborts execution with [`RuntimeError::BudgetExceeded`] once the
    /// counter passes `budget`.
    pub fn with_budget(budget: u64) -> Self {
        let mut sandbox = Sandbox::new();
        sandbox.budget = Some(budget);
        sandbox
    }

    /// Instructions counted so far.
    pub fn instruction_count(&self) -> u64 {
        self.counter.borrow().count()
    }

    /// Looks up a name in the sandbox scope chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.env.get(name)
    }

    /// Parses and runs a script. Returns the value of the last top-level
    /// expression statement, or `Undefined` if there is none.
    pub fn run(&mut self, source: &str) -> RuntimeResult<Value> {
        let file = SourceFile::new("sandbox", source);
        let result = parse_source(&file);
        if result.errors.has_errors() {
            let messages: Vec<String> =
                result.errors.errors.iter().map(|e| e.to_string()).collect();
            return Err(RuntimeError::Parse(messages.join("; ")));
        }
        let program = match result.program {
            Some(p) => p,
            None => return Err(RuntimeError::Parse("empty parse result".to_string())),
        };
        let body = match &program.kind {
            NodeKind::Program { body } => body,
            _ => return Err(RuntimeError::Parse("not a program".to_string())),
        };
        let mut completion = Value::Undefined;
        for stmt in body {
            if let NodeKind::ExpressionStatement { expression } = &stmt.kind {
                completion = self.eval_expr(expression)?;
            } else {
                self.eval_stmt(stmt)?;
            }
        }
        Ok(completion)
    }

    // ── Statements ──

    fn eval_stmt(&mut self, node: &Node) -> RuntimeResult<()> {
        match &node.kind {
            NodeKind::ExpressionStatement { expression } => {
                self.eval_expr(expression)?;
                Ok(())
            }
            NodeKind::BlockStatement { body } => {
                self.env.push_scope();
                let result = self.eval_block_body(body);
                self.env.pop_scope();
                result
            }
            NodeKind::VariableDeclaration { declarations, .. } => {
                for decl in declarations {
                    self.eval_declarator(decl)?;
                }
                Ok(())
            }
            NodeKind::FunctionDeclaration {
                id,
                params,
                body,
                generator,
            } => {
                let name = identifier_name(id)?;
                let func = Value::Function(Rc::new(FunctionValue {
                    name: Some(name.to_string()),
                    params: param_names(params)?,
                    body: (**body).clone(),
                    expression_body: false,
                    generator: *generator,
                }));
                self.env.define(name, func);
                Ok(())
            }
            NodeKind::ReturnStatement { argument } => {
                let value = match argument {
                    Some(a) => self.eval_expr(a)?,
                    None => Value::Undefined,
                };
                Err(RuntimeError::Return(value))
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test)?.truthy() {
                    self.eval_stmt(consequent)
                } else if let Some(alt) = alternate {
                    self.eval_stmt(alt)
                } else {
                    Ok(())
                }
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.env.push_scope();
                let result = self.eval_for(init, test, update, body);
                self.env.pop_scope();
                result
            }
            NodeKind::ForInStatement { left, right, body } => {
                let keys = self.enumerate_keys(right)?;
                self.eval_for_each(left, keys, body)
            }
            NodeKind::ForOfStatement { left, right, body } => {
                let items = self.enumerate_items(right)?;
                self.eval_for_each(left, items, body)
            }
            NodeKind::WhileStatement { test, body } => {
                while self.eval_expr(test)?.truthy() {
                    match self.eval_stmt(body) {
                        Err(RuntimeError::Break) => break,
                        Err(RuntimeError::Continue) => continue,
                        other => other?,
                    }
                }
                Ok(())
            }
            NodeKind::DoWhileStatement { body, test } => {
                loop {
                    match self.eval_stmt(body) {
                        Err(RuntimeError::Break) => break,
                        Err(RuntimeError::Continue) => {}
                        other => other?,
                    }
                    if !self.eval_expr(test)?.truthy() {
                        break;
                    }
                }
                Ok(())
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => self.eval_switch(discriminant, cases),
            NodeKind::ThrowStatement { argument } => {
                let value = self.eval_expr(argument)?;
                Err(RuntimeError::Thrown(value.to_string()))
            }
            NodeKind::BreakStatement => Err(RuntimeError::Break),
            NodeKind::ContinueStatement => Err(RuntimeError::Continue),
            NodeKind::EmptyStatement => Ok(()),
            NodeKind::WithStatement { .. } => Err(RuntimeError::Unsupported("with statement")),
            _ => Err(RuntimeError::Unsupported("statement kind")),
        }
    }

    fn eval_block_body(&mut self, body: &[Node]) -> RuntimeResult<()> {
        for stmt in body {
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    fn eval_declarator(&mut self, decl: &Node) -> RuntimeResult<()> {
        let (id, init) = match &decl.kind {
            NodeKind::VariableDeclarator { id, init } => (id, init),
            _ => return Err(RuntimeError::Unsupported("declarator kind")),
        };
        let value = match init {
            Some(expr) => self.eval_expr(expr)?,
            None => Value::Undefined,
        };
        self.bind_pattern(id, value)
    }

    fn bind_pattern(&mut self, target: &Node, value: Value) -> RuntimeResult<()> {
        match &target.kind {
            NodeKind::Identifier { name } => {
                self.env.define(name, value);
                Ok(())
            }
            NodeKind::ArrayPattern { elements } => {
                let items = match &value {
                    Value::Array(items) => items.borrow().clone(),
                    _ => return Err(RuntimeError::TypeMismatch("destructuring a non-array")),
                };
                for (i, element) in elements.iter().enumerate() {
                    if let Some(element) = element {
                        let item = items.get(i).cloned().unwrap_or(Value::Undefined);
                        self.bind_pattern(element, item)?;
                    }
                }
                Ok(())
            }
            _ => Err(RuntimeError::TypeMismatch("invalid binding target")),
        }
    }

    fn eval_for(
        &mut self,
        init: &Option<Box<Node>>,
        test: &Option<Box<Node>>,
        update: &Option<Box<Node>>,
        body: &Node,
    ) -> RuntimeResult<()> {
        if let Some(init) = init {
            // The init slot holds either a declaration or a bare expression.
            if matches!(init.kind, NodeKind::VariableDeclaration { .. }) {
                self.eval_stmt(init)?;
            } else {
                self.eval_expr(init)?;
            }
        }
        loop {
            if let Some(test) = test {
                if !self.eval_expr(test)?.truthy() {
                    break;
                }
            }
            match self.eval_stmt(body) {
                Err(RuntimeError::Break) => break,
                Err(RuntimeError::Continue) => {}
                other => other?,
            }
            if let Some(update) = update {
                self.eval_expr(update)?;
            }
        }
        Ok(())
    }

    /// Shared loop body for `for-in` (keys) and `for-of` (items).
    fn eval_for_each(&mut self, left: &Node, values: Vec<Value>, body: &Node) -> RuntimeResult<()> {
        let (target, declares) = loop_target(left)?;
        self.env.push_scope();
        let mut result = Ok(());
        for value in values {
            if declares {
                self.env.define(target, value);
            } else if !self.env.set(target, value.clone()) {
                self.env.define_global(target, value);
            }
            match self.eval_stmt(body) {
                Err(RuntimeError::Break) => break,
                Err(RuntimeError::Continue) => continue,
                Err(e) => {
                    result = Err(e);
                    break;
                }
                Ok(()) => {}
            }
        }
        self.env.pop_scope();
        result
    }

    fn enumerate_keys(&mut self, right: &Node) -> RuntimeResult<Vec<Value>> {
        match self.eval_expr(right)? {
            Value::Object(map) => Ok(map.borrow().keys().cloned().map(Value::Str).collect()),
            Value::Array(items) => Ok((0..items.borrow().len())
                .map(|i| Value::Str(i.to_string()))
                .collect()),
            Value::Undefined | Value::Null => Ok(Vec::new()),
            _ => Err(RuntimeError::TypeMismatch("for-in over a non-object")),
        }
    }

    fn enumerate_items(&mut self, right: &Node) -> RuntimeResult<Vec<Value>> {
        match self.eval_expr(right)? {
            Value::Array(items) => Ok(items.borrow().clone()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            _ => Err(RuntimeError::TypeMismatch("for-of over a non-iterable")),
        }
    }

    fn eval_switch(&mut self, discriminant: &Node, cases: &[Node]) -> RuntimeResult<()> {
        let subject = self.eval_expr(discriminant)?;
        let mut start = None;
        let mut default = None;
        for (i, case) in cases.iter().enumerate() {
            let test = match &case.kind {
                NodeKind::SwitchCase { test, .. } => test,
                _ => return Err(RuntimeError::Unsupported("switch case kind")),
            };
            match test {
                Some(test) => {
                    let candidate = self.eval_expr(test)?;
                    if strict_eq(&subject, &candidate) {
                        start = Some(i);
                        break;
                    }
                }
                None => default = Some(i),
            }
        }
        let Some(start) = start.or(default) else {
            return Ok(());
        };
        self.env.push_scope();
        let mut result = Ok(());
        'cases: for case in &cases[start..] {
            if let NodeKind::SwitchCase { consequent, .. } = &case.kind {
                for stmt in consequent {
                    match self.eval_stmt(stmt) {
                        Err(RuntimeError::Break) => break 'cases,
                        Err(e) => {
                            result = Err(e);
                            break 'cases;
                        }
                        Ok(()) => {}
                    }
                }
            }
        }
        self.env.pop_scope();
        result
    }

    // ── Expressions ──

    fn eval_expr(&mut self, node: &Node) -> RuntimeResult<Value> {
        match &node.kind {
            NodeKind::Identifier { name } => self
                .env
                .get(name)
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
            NodeKind::Literal { value } => Ok(literal_value(value)),
            NodeKind::ThisExpression => Ok(Value::Undefined),
            NodeKind::ArrayExpression { elements } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(match element {
                        Some(e) => self.eval_expr(e)?,
                        None => Value::Undefined,
                    });
                }
                Ok(Value::Array(Rc::new(RefCell::new(items))))
            }
            NodeKind::ObjectExpression { properties } => {
                let mut map = BTreeMap::new();
                for property in properties {
                    let (key, value) = match &property.kind {
                        NodeKind::Property { key, value } => (key, value),
                        _ => return Err(RuntimeError::Unsupported("property kind")),
                    };
                    let key = property_key_name(key)?;
                    let value = self.eval_expr(value)?;
                    map.insert(key, value);
                }
                Ok(Value::Object(Rc::new(RefCell::new(map))))
            }
            NodeKind::FunctionExpression {
                id,
                params,
                body,
                generator,
            } => {
                let name = match id {
                    Some(id) => Some(identifier_name(id)?.to_string()),
                    None => None,
                };
                Ok(Value::Function(Rc::new(FunctionValue {
                    name,
                    params: param_names(params)?,
                    body: (**body).clone(),
                    expression_body: false,
                    generator: *generator,
                })))
            }
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression,
            } => Ok(Value::Function(Rc::new(FunctionValue {
                name: None,
                params: param_names(params)?,
                body: (**body).clone(),
                expression_body: *expression,
                generator: false,
            }))),
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.eval_expr(object)?;
                let key = self.member_key(property, *computed)?;
                self.get_member(&object, &key)
            }
            NodeKind::CallExpression { callee, arguments } => self.eval_call(callee, arguments),
            NodeKind::UnaryExpression { op, argument } => self.eval_unary(*op, argument),
            NodeKind::UpdateExpression {
                op,
                argument,
                prefix,
            } => self.eval_update(*op, argument, *prefix),
            NodeKind::BinaryExpression { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                eval_binary(*op, &lhs, &rhs)
            }
            NodeKind::LogicalExpression { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                match op {
                    LogicalOp::And if !lhs.truthy() => Ok(lhs),
                    LogicalOp::Or if lhs.truthy() => Ok(lhs),
                    _ => self.eval_expr(right),
                }
            }
            NodeKind::AssignmentExpression { op, left, right } => {
                self.eval_assignment(*op, left, right)
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test)?.truthy() {
                    self.eval_expr(consequent)
                } else {
                    self.eval_expr(alternate)
                }
            }
            NodeKind::NewExpression { .. } => Err(RuntimeError::Unsupported("new expression")),
            NodeKind::MetaProperty { .. } => Err(RuntimeError::Unsupported("new.target")),
            NodeKind::YieldExpression { .. } => Err(RuntimeError::Unsupported("yield")),
            _ => Err(RuntimeError::Unsupported("expression kind")),
        }
    }

    fn eval_call(&mut self, callee: &Node, arguments: &[Node]) -> RuntimeResult<Value> {
        // Counter method calls are intercepted before ordinary dispatch so
        // `incr` can mutate the shared counter and enforce the budget.
        if let NodeKind::MemberExpression {
            object,
            property,
            computed,
        } = &callee.kind
        {
            let object = self.eval_expr(object)?;
            let key = self.member_key(property, *computed)?;
            if let Value::Counter(counter) = &object {
                return self.call_counter_method(counter, &key, arguments);
            }
            let callee = self.get_member(&object, &key)?;
            let args = self.eval_arguments(arguments)?;
            return self.call_value(&callee, args);
        }
        let callee = self.eval_expr(callee)?;
        let args = self.eval_arguments(arguments)?;
        self.call_value(&callee, args)
    }

    fn call_counter_method(
        &mut self,
        counter: &Rc<RefCell<InstructionCounter>>,
        method: &str,
        arguments: &[Node],
    ) -> RuntimeResult<Value> {
        match method {
            "incr" => {
                let amount = match arguments.first() {
                    Some(arg) => {
                        let v = self.eval_expr(arg)?;
                        v.as_number()
                            .ok_or(RuntimeError::TypeMismatch("incr expects a number"))?
                    }
                    None => 0.0,
                };
                let truthy = counter.borrow_mut().incr(amount as i64);
                if let Some(budget) = self.budget {
                    let used = counter.borrow().count();
                    if used > budget {
                        return Err(RuntimeError::BudgetExceeded { used, budget });
                    }
                }
                Ok(Value::Bool(truthy))
            }
            "count" => Ok(Value::Number(counter.borrow().count() as f64)),
            _ => Err(RuntimeError::NotAFunction),
        }
    }

    fn eval_arguments(&mut self, arguments: &[Node]) -> RuntimeResult<Vec<Value>> {
        arguments.iter().map(|a| self.eval_expr(a)).collect()
    }

    fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> RuntimeResult<Value> {
        let func = match callee {
            Value::Function(f) => Rc::clone(f),
            _ => return Err(RuntimeError::NotAFunction),
        };
        if func.generator {
            return Err(RuntimeError::Unsupported("generator call"));
        }
        self.env.push_scope();
        for (i, param) in func.params.iter().enumerate() {
            let arg = args.get(i).cloned().unwrap_or(Value::Undefined);
            self.env.define(param, arg);
        }
        let result = if func.expression_body {
            self.eval_expr(&func.body)
        } else {
            match self.eval_stmt(&func.body) {
                Ok(()) => Ok(Value::Undefined),
                Err(RuntimeError::Return(value)) => Ok(value),
                Err(e) => Err(e),
            }
        };
        self.env.pop_scope();
        result
    }

    fn eval_unary(&mut self, op: UnaryOp, argument: &Node) -> RuntimeResult<Value> {
        match op {
            UnaryOp::TypeOf => {
                // `typeof missing` yields "undefined" rather than an error.
                if let NodeKind::Identifier { name } = &argument.kind {
                    if self.env.get(name).is_none() {
                        return Ok(Value::Str("undefined".to_string()));
                    }
                }
                let value = self.eval_expr(argument)?;
                Ok(Value::Str(value.type_of().to_string()))
            }
            UnaryOp::Void => {
                self.eval_expr(argument)?;
                Ok(Value::Undefined)
            }
            UnaryOp::Delete => self.eval_delete(argument),
            UnaryOp::Not => {
                let value = self.eval_expr(argument)?;
                Ok(Value::Bool(!value.truthy()))
            }
            UnaryOp::Neg => {
                let n = self.expect_number(argument)?;
                Ok(Value::Number(-n))
            }
            UnaryOp::Pos => {
                let n = self.expect_number(argument)?;
                Ok(Value::Number(n))
            }
        }
    }

    fn eval_delete(&mut self, argument: &Node) -> RuntimeResult<Value> {
        if let NodeKind::MemberExpression {
            object,
            property,
            computed,
        } = &argument.kind
        {
            let object = self.eval_expr(object)?;
            let key = self.member_key(property, *computed)?;
            match object {
                // The counter cannot be dismantled from inside the sandbox.
                Value::Counter(_) => return Ok(Value::Bool(true)),
                Value::Object(map) => {
                    map.borrow_mut().remove(&key);
                    return Ok(Value::Bool(true));
                }
                _ => return Ok(Value::Bool(true)),
            }
        }
        Ok(Value::Bool(true))
    }

    fn eval_update(&mut self, op: UpdateOp, argument: &Node, prefix: bool) -> RuntimeResult<Value> {
        let old = self.expect_number(argument)?;
        let new = match op {
            UpdateOp::Incr => old + 1.0,
            UpdateOp::Decr => old - 1.0,
        };
        self.store(argument, Value::Number(new))?;
        Ok(Value::Number(if prefix { new } else { old }))
    }

    fn eval_assignment(&mut self, op: AssignOp, left: &Node, right: &Node) -> RuntimeResult<Value> {
        let rhs = self.eval_expr(right)?;
        let value = match op {
            AssignOp::Assign => rhs,
            _ => {
                let lhs = self.eval_expr(left)?;
                let binary = match op {
                    AssignOp::AddAssign => BinaryOp::Add,
                    AssignOp::SubAssign => BinaryOp::Sub,
                    AssignOp::MulAssign => BinaryOp::Mul,
                    AssignOp::DivAssign => BinaryOp::Div,
                    AssignOp::ModAssign => BinaryOp::Mod,
                    AssignOp::Assign => unreachable!(),
                };
                eval_binary(binary, &lhs, &rhs)?
            }
        };
        self.store(left, value.clone())?;
        Ok(value)
    }

    /// Writes through an assignment target: a bound name, a fresh global,
    /// or an object/array member.
    fn store(&mut self, target: &Node, value: Value) -> RuntimeResult<()> {
        match &target.kind {
            NodeKind::Identifier { name } => {
                if !self.env.set(name, value.clone()) {
                    self.env.define_global(name, value);
                }
                Ok(())
            }
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.eval_expr(object)?;
                let key = self.member_key(property, *computed)?;
                self.set_member(&object, &key, value)
            }
            _ => Err(RuntimeError::TypeMismatch("invalid assignment target")),
        }
    }

    fn member_key(&mut self, property: &Node, computed: bool) -> RuntimeResult<String> {
        if computed {
            let key = self.eval_expr(property)?;
            Ok(key.to_string())
        } else {
            Ok(identifier_name(property)?.to_string())
        }
    }

    fn get_member(&mut self, object: &Value, key: &str) -> RuntimeResult<Value> {
        match object {
            Value::Counter(counter) => match key {
                "count" => Ok(Value::Number(counter.borrow().count() as f64)),
                _ => Ok(Value::Undefined),
            },
            Value::Object(map) => Ok(map.borrow().get(key).cloned().unwrap_or(Value::Undefined)),
            Value::Array(items) => {
                if key == "length" {
                    return Ok(Value::Number(items.borrow().len() as f64));
                }
                match key.parse::<usize>() {
                    Ok(i) => Ok(items.borrow().get(i).cloned().unwrap_or(Value::Undefined)),
                    Err(_) => Ok(Value::Undefined),
                }
            }
            Value::Str(s) => {
                if key == "length" {
                    Ok(Value::Number(s.chars().count() as f64))
                } else {
                    Ok(Value::Undefined)
                }
            }
            _ => Err(RuntimeError::TypeMismatch("member access on a non-object")),
        }
    }

    fn set_member(&mut self, object: &Value, key: &str, value: Value) -> RuntimeResult<()> {
        match object {
            // Writes to the counter are silently discarded.
            Value::Counter(_) => Ok(()),
            Value::Object(map) => {
                map.borrow_mut().insert(key.to_string(), value);
                Ok(())
            }
            Value::Array(items) => {
                if let Ok(i) = key.parse::<usize>() {
                    let mut items = items.borrow_mut();
                    if i >= items.len() {
                        items.resize(i + 1, Value::Undefined);
                    }
                    items[i] = value;
                }
                Ok(())
            }
            _ => Err(RuntimeError::TypeMismatch("member write on a non-object")),
        }
    }

    fn expect_number(&mut self, node: &Node) -> RuntimeResult<f64> {
        let value = self.eval_expr(node)?;
        value
            .as_number()
            .ok_or(RuntimeError::TypeMismatch("expected a number"))
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Sandbox::new()
    }
}

fn identifier_name(node: &Node) -> RuntimeResult<&str> {
    match &node.kind {
        NodeKind::Identifier { name } => Ok(name),
        _ => Err(RuntimeError::TypeMismatch("expected an identifier")),
    }
}

fn param_names(params: &[Node]) -> RuntimeResult<Vec<String>> {
    params
        .iter()
        .map(|p| identifier_name(p).map(str::to_string))
        .collect()
}

fn property_key_name(key: &Node) -> RuntimeResult<String> {
    match &key.kind {
        NodeKind::Identifier { name } => Ok(name.clone()),
        NodeKind::Literal {
            value: LiteralValue::Str(s),
        } => Ok(s.clone()),
        NodeKind::Literal {
            value: LiteralValue::Number(n),
        } => Ok(Value::Number(*n).to_string()),
        _ => Err(RuntimeError::TypeMismatch("invalid property key")),
    }
}

/// The bound name of a `for-in` / `for-of` loop head, and whether the head
/// declares it (a bare identifier assigns the existing binding instead).
fn loop_target(left: &Node) -> RuntimeResult<(&str, bool)> {
    match &left.kind {
        NodeKind::Identifier { name } => Ok((name, false)),
        NodeKind::VariableDeclaration { declarations, .. } => match declarations.first() {
            Some(decl) => match &decl.kind {
                NodeKind::VariableDeclarator { id, .. } => {
                    identifier_name(id).map(|name| (name, true))
                }
                _ => Err(RuntimeError::TypeMismatch("invalid loop target")),
            },
            None => Err(RuntimeError::TypeMismatch("invalid loop target")),
        },
        _ => Err(RuntimeError::TypeMismatch("invalid loop target")),
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::Str(s.clone()),
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Null => Value::Null,
    }
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Counter(x), Value::Counter(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Number(x), Value::Str(y)) | (Value::Str(y), Value::Number(x)) => {
            y.trim().parse::<f64>().map(|n| n == *x).unwrap_or(false)
        }
        (Value::Bool(_), _) => a
            .as_number()
            .map(|x| loose_eq(&Value::Number(x), b))
            .unwrap_or(false),
        (_, Value::Bool(_)) => b
            .as_number()
            .map(|y| loose_eq(a, &Value::Number(y)))
            .unwrap_or(false),
        _ => strict_eq(a, b),
    }
}

fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> RuntimeResult<Value> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(loose_eq(lhs, rhs))),
        BinaryOp::NotEq => return Ok(Value::Bool(!loose_eq(lhs, rhs))),
        BinaryOp::StrictEq => return Ok(Value::Bool(strict_eq(lhs, rhs))),
        BinaryOp::StrictNotEq => return Ok(Value::Bool(!strict_eq(lhs, rhs))),
        _ => {}
    }
    if op == BinaryOp::Add {
        if let (Value::Str(_), _) | (_, Value::Str(_)) = (lhs, rhs) {
            return Ok(Value::Str(format!("{lhs}{rhs}")));
        }
    }
    if let (Value::Str(x), Value::Str(y)) = (lhs, rhs) {
        let result = match op {
            BinaryOp::Less => x < y,
            BinaryOp::Greater => x > y,
            BinaryOp::LessEq => x <= y,
            BinaryOp::GreaterEq => x >= y,
            _ => return Err(RuntimeError::TypeMismatch("arithmetic on strings")),
        };
        return Ok(Value::Bool(result));
    }
    let x = lhs
        .as_number()
        .ok_or(RuntimeError::TypeMismatch("expected a number"))?;
    let y = rhs
        .as_number()
        .ok_or(RuntimeError::TypeMismatch("expected a number"))?;
    let result = match op {
        BinaryOp::Less => Value::Bool(x < y),
        BinaryOp::Greater => Value::Bool(x > y),
        BinaryOp::LessEq => Value::Bool(x <= y),
        BinaryOp::GreaterEq => Value::Bool(x >= y),
        BinaryOp::Add => Value::Number(x + y),
        BinaryOp::Sub => Value::Number(x - y),
        BinaryOp::Mul => Value::Number(x * y),
        BinaryOp::Div => Value::Number(x / y),
        BinaryOp::Mod => Value::Number(x % y),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => {
            unreachable!()
        }
    };
    Ok(result)
}
