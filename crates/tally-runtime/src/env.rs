//! Lexical scope stack for the sandbox evaluator.

use std::collections::HashMap;

use crate::value::Value;

type Scope = HashMap<String, Value>;

/// A stack of scopes. Lookups walk from the innermost scope outward;
/// the bottom scope is the sandbox global scope and is never popped.
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1);
        self.scopes.pop();
    }

    /// Defines a name in the innermost scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.scopes
            .last_mut()
            .expect("environment has at least one scope")
            .insert(name.to_string(), value);
    }

    /// Defines a name in the global scope.
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.scopes[0].insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).cloned())
    }

    /// Assigns to an existing binding. Returns false if the name is unbound.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_outer() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.push_scope();
        env.define("x", Value::Number(2.0));
        assert_eq!(env.get("x").unwrap().as_number(), Some(2.0));
        env.pop_scope();
        assert_eq!(env.get("x").unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn test_set_targets_the_binding_scope() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.push_scope();
        assert!(env.set("x", Value::Number(5.0)));
        env.pop_scope();
        assert_eq!(env.get("x").unwrap().as_number(), Some(5.0));
    }

    #[test]
    fn test_set_unbound_name_fails() {
        let mut env = Environment::new();
        assert!(!env.set("missing", Value::Null));
        assert!(env.get("missing").is_none());
    }
}
