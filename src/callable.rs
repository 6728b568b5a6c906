//! Callable object model: native functions, user functions (closures and
//! bound methods) and classes share one capability set, `arity` + `call`.

use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::FunctionDecl;
use crate::class::{Instance, LoxClass};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Host‑provided function body.  Errors are plain messages; the caller
/// attaches the call site's line.
pub type NativeFn = for<'v> fn(&[Value<'v>]) -> std::result::Result<Value<'v>, String>;

/// Anything that can appear to the left of `(...)`.
#[derive(Clone)]
pub enum Callable<'a> {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction<'a>>),
    Class(Rc<LoxClass<'a>>),
}

impl<'a> Callable<'a> {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invokes the callable.  Arity has already been checked by the caller;
    /// `paren` locates errors raised by native code.
    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        paren: &Token<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        match self {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);

                (native.func)(&arguments).map_err(|msg| LoxError::runtime(paren, msg))
            }

            Callable::Function(function) => function.call(interpreter, arguments),

            Callable::Class(class) => LoxClass::instantiate(class, interpreter, arguments),
        }
    }
}

impl<'a> PartialEq for Callable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Callable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::Class(class) => write!(f, "{}", class.name()),
        }
    }
}

impl<'a> fmt::Debug for Callable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "Native({})", native.name),
            Callable::Function(function) => write!(f, "Function({})", function.name()),
            Callable::Class(class) => write!(f, "Class({})", class.name()),
        }
    }
}

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

/// `clock()`: seconds since the Unix epoch.
pub fn clock<'v>(_args: &[Value<'v>]) -> std::result::Result<Value<'v>, String> {
    let now = chrono::Utc::now();
    let seconds = now.timestamp_micros() as f64 / 1_000_000.0;

    debug!("Native function 'clock' returned: {}", seconds);

    Ok(Value::Number(seconds))
}

/// A user function: its declaration plus the environment it closed over.
pub struct LoxFunction<'a> {
    declaration: &'a FunctionDecl<'a>,
    closure: EnvRef<'a>,
    is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn new(
        declaration: &'a FunctionDecl<'a>,
        closure: EnvRef<'a>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &'a str {
        self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Returns a copy whose closure is extended with `this` bound to
    /// `instance`.  `self` is left untouched.
    pub fn bind(&self, instance: Rc<Instance<'a>>) -> LoxFunction<'a> {
        debug!("Binding '{}' to an instance", self.name());

        let environment: EnvRef<'a> = Environment::child_of(&self.closure);
        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));

        LoxFunction {
            declaration: self.declaration,
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Calling user-defined function '{}'", self.name());

        let declaration: &'a FunctionDecl<'a> = self.declaration;
        let environment: EnvRef<'a> = Environment::child_of(&self.closure);

        {
            let mut frame = environment.borrow_mut();
            for (param, argument) in declaration.params.iter().zip(arguments) {
                frame.define(param.lexeme, argument);
            }
        }

        let flow: Flow<'a> = interpreter.execute_block(&declaration.body, environment)?;

        if self.is_initializer {
            return Ok(self.bound_this());
        }

        let value = match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        };

        info!("Function '{}' returned: {}", self.name(), value);

        Ok(value)
    }

    /// The instance an initializer was bound to (`this` at distance 0).
    fn bound_this(&self) -> Value<'a> {
        Environment::lookup_at(&self.closure, 0, "this").unwrap_or(Value::Nil)
    }
}

impl<'a> fmt::Debug for LoxFunction<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}
