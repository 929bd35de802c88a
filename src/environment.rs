// ABOUTME: The environment chain, `{ values: name -> Value, enclosing: parent }`
// Each scope is an `Rc<Environment>` with interior-mutable bindings and an immutable parent link.

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    values: RefCell<HashMap<String, Value>>,
    enclosing: Option<Rc<Environment>>,
}

impl Environment {
    /// The global environment has no parent.
    pub fn new_global() -> Rc<Self> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            enclosing: None,
        })
    }

    /// A block scope's parent is whatever environment was active when the block was entered.
    pub fn new_enclosed(enclosing: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            enclosing: Some(enclosing),
        })
    }

    /// Always succeeds; redefinition silently overwrites in the same scope.
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    /// Whether `name` is bound in THIS scope, without walking the parent chain. Used by
    /// `VarStmt` to decide whether a re-declaration should define a fresh `nil` binding instead
    /// of leaving an existing value untouched.
    pub fn defined_here(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Searches this scope, then each enclosing scope in order.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(parent) = &self.enclosing {
            return parent.get(name);
        }
        Err(RuntimeError::undefined_variable(&name.lexeme, name.line))
    }

    /// Updates the nearest scope that already contains `name`; never creates a new binding.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.values.borrow().contains_key(&name.lexeme) {
            self.values.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }
        if let Some(parent) = &self.enclosing {
            return parent.assign(name, value);
        }
        Err(RuntimeError::undefined_variable(&name.lexeme, name.line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, TokenKind};

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, Literal::None, 1)
    }

    #[test]
    fn define_then_get() {
        let env = Environment::new_global();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.get(&ident("x")).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn get_undefined_fails_with_line_and_name() {
        let env = Environment::new_global();
        let err = env.get(&ident("missing")).unwrap_err();
        assert_eq!(err.message, "undefined variable 'missing' at line 1");
    }

    #[test]
    fn assign_to_undefined_always_fails() {
        let env = Environment::new_global();
        assert!(env.assign(&ident("x"), Value::Nil).is_err());
    }

    #[test]
    fn child_shadows_parent_in_its_own_scope() {
        let parent = Environment::new_global();
        parent.define("x", Value::Number(1.0));
        let child = Environment::new_enclosed(parent.clone());
        child.define("x", Value::Number(2.0));

        assert_eq!(child.get(&ident("x")).unwrap(), Value::Number(2.0));
        assert_eq!(parent.get(&ident("x")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new_global();
        parent.define("x", Value::Number(1.0));
        let child = Environment::new_enclosed(parent);
        assert_eq!(child.get(&ident("x")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_updates_nearest_existing_binding_not_child() {
        let parent = Environment::new_global();
        parent.define("x", Value::Number(1.0));
        let child = Environment::new_enclosed(parent.clone());

        child.assign(&ident("x"), Value::Number(99.0)).unwrap();

        assert_eq!(parent.get(&ident("x")).unwrap(), Value::Number(99.0));
        assert!(!child.defined_here("x"));
    }

    #[test]
    fn multi_level_lookup() {
        let grandparent = Environment::new_global();
        grandparent.define("a", Value::Number(1.0));
        let parent = Environment::new_enclosed(grandparent);
        parent.define("b", Value::Number(2.0));
        let child = Environment::new_enclosed(parent);
        child.define("c", Value::Number(3.0));

        assert_eq!(child.get(&ident("a")).unwrap(), Value::Number(1.0));
        assert_eq!(child.get(&ident("b")).unwrap(), Value::Number(2.0));
        assert_eq!(child.get(&ident("c")).unwrap(), Value::Number(3.0));
    }
}
