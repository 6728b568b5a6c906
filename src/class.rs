//! Classes and their instances.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, LoxFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Name of the constructor method.
pub const INITIALIZER: &str = "init";

pub struct LoxClass<'a> {
    name: &'a str,
    superclass: Option<Rc<LoxClass<'a>>>,
    methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
}

impl<'a> LoxClass<'a> {
    pub fn new(
        name: &'a str,
        superclass: Option<Rc<LoxClass<'a>>>,
        methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn superclass(&self) -> Option<&Rc<LoxClass<'a>>> {
        self.superclass.as_ref()
    }

    /// Looks in this class, then each ancestor in order.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction<'a>>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// Arity of the (possibly inherited) initializer, or 0.
    pub fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |initializer| initializer.arity())
    }

    /// Allocates an instance and runs `init` on it when one exists.
    pub fn instantiate(
        class: &Rc<LoxClass<'a>>,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Instantiating class '{}'", class.name);

        let instance: Rc<Instance<'a>> = Rc::new(Instance::new(Rc::clone(class)));

        if let Some(initializer) = class.find_method(INITIALIZER) {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl<'a> fmt::Debug for LoxClass<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field("superclass", &self.superclass().map(|s| s.name()))
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Runtime object created by calling a class.
pub struct Instance<'a> {
    class: Rc<LoxClass<'a>>,
    fields: RefCell<HashMap<&'a str, Value<'a>>>,
}

impl<'a> Instance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass<'a>> {
        &self.class
    }

    /// Fields shadow methods; methods come back bound to this instance.
    pub fn get(self: &Rc<Self>, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = self.fields.borrow().get(name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(name.lexeme) {
            let bound = method.bind(Rc::clone(self));
            return Ok(Value::Callable(Callable::Function(Rc::new(bound))));
        }

        Err(LoxError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    /// Always writes the field table, even when a method has the same name.
    pub fn set(&self, name: &Token<'a>, value: Value<'a>) {
        self.fields.borrow_mut().insert(name.lexeme, value);
    }
}

impl<'a> fmt::Debug for Instance<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}
