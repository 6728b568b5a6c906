//! Chained lexical scope frames.
//!
//! A frame maps names to values and links to at most one enclosing frame.
//! Frames are shared through [`EnvRef`] because closures routinely outlive
//! the block that created them; the enclosing link is fixed at creation, so
//! the chain from any frame to the globals is finite and acyclic.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to a scope frame.
pub type EnvRef<'a> = Rc<RefCell<Environment<'a>>>;

#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<&'a str, Value<'a>>,
    enclosing: Option<EnvRef<'a>>,
}

impl<'a> Environment<'a> {
    /// A fresh global frame.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef<'a>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wraps a new child of `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef<'a>) -> EnvRef<'a> {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Binds `name` in this frame, overwriting any previous binding.
    pub fn define(&mut self, name: &'a str, value: Value<'a>) {
        self.values.insert(name, value);
    }

    /// Searches this frame, then each enclosing frame.
    pub fn get(&self, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Mutates the nearest existing binding; never creates one.
    pub fn assign(&mut self, name: &Token<'a>, value: Value<'a>) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Walks exactly `distance` enclosing links from `env`.
    pub fn ancestor(env: &EnvRef<'a>, distance: usize) -> EnvRef<'a> {
        let mut current: EnvRef<'a> = Rc::clone(env);

        for _ in 0..distance {
            let next = match &current.borrow().enclosing {
                Some(next) => Rc::clone(next),
                None => break,
            };
            current = next;
        }

        current
    }

    /// Reads `name` from the frame exactly `distance` hops out, without
    /// searching further.
    pub fn get_at(env: &EnvRef<'a>, distance: usize, name: &Token<'a>) -> Result<Value<'a>> {
        debug!("get_at '{}' distance={}", name.lexeme, distance);

        let frame = Self::ancestor(env, distance);
        let value = frame.borrow().values.get(name.lexeme).cloned();

        value.ok_or_else(|| undefined(name))
    }

    /// Same as [`Environment::get_at`] for internal names such as `this`
    /// and `super` that have no token of their own.
    pub fn lookup_at(env: &EnvRef<'a>, distance: usize, name: &str) -> Option<Value<'a>> {
        let frame = Self::ancestor(env, distance);
        let value = frame.borrow().values.get(name).cloned();
        value
    }

    /// Overwrites `name` in the frame exactly `distance` hops out.
    pub fn assign_at(
        env: &EnvRef<'a>,
        distance: usize,
        name: &Token<'a>,
        value: Value<'a>,
    ) -> Result<()> {
        debug!("assign_at '{}' distance={}", name.lexeme, distance);

        let frame = Self::ancestor(env, distance);
        let mut frame = frame.borrow_mut();

        match frame.values.get_mut(name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token<'_>) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
