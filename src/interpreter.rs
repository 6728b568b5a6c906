//! Tree‑walking evaluator.
//!
//! The interpreter owns a single *current environment* cursor which is
//! swapped on every block and call boundary and always restored afterwards,
//! whether the body completed, returned, or failed.  Variable sites that the
//! [`crate::resolver::Resolver`] recorded are read with an exact hop count;
//! every other name is looked up in the global frame.
//!
//! `return` does not travel through [`LoxError`]: statement execution yields
//! [`Flow`], and only a function invocation turns `Flow::Return` back into a
//! value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::callable::{self, Callable, LoxFunction, NativeFunction};
use crate::class::{LoxClass, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Outcome of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<'a> {
    /// Fell off the end; continue with the next statement.
    Normal,

    /// A `return` is unwinding to the nearest function invocation.
    Return(Value<'a>),
}

pub struct Interpreter<'a> {
    globals: EnvRef<'a>,
    environment: EnvRef<'a>,

    /// Side‑table filled by the resolver: expression site → hop count.
    locals: HashMap<ExprId, usize>,

    /// Sink for `print`.
    out: Box<dyn Write>,
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter printing to stdout, with the native functions
    /// (`clock`) defined as globals.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an interpreter whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef<'a> = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: callable::clock,
            }))),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Called by the resolver for every local variable site.
    pub fn record_resolution(&mut self, id: ExprId, distance: usize) {
        debug!("Recording {:?} at distance {}", id, distance);

        self.locals.insert(id, distance);
    }

    /// Distance recorded for `id`, or `None` for a global site.
    pub fn resolved_distance(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    pub fn globals(&self) -> &EnvRef<'a> {
        &self.globals
    }

    /// Runs a program.  Stops at the first runtime error; whatever was
    /// printed before it is still flushed.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        let outcome: Result<()> = statements
            .iter()
            .try_for_each(|stmt| self.execute(stmt).map(|_| ()));

        self.out.flush()?;

        if outcome.is_ok() {
            info!("Interpretation completed successfully");
        }

        outcome
    }

    /// Runs `statements` with `environment` as the current frame, then
    /// restores the previous frame.
    pub fn execute_block(
        &mut self,
        statements: &'a [Stmt<'a>],
        environment: EnvRef<'a>,
    ) -> Result<Flow<'a>> {
        self.with_environment(environment, |interpreter| {
            for stmt in statements {
                if let Flow::Return(value) = interpreter.execute(stmt)? {
                    return Ok(Flow::Return(value));
                }
            }

            Ok(Flow::Normal)
        })
    }

    /// Swaps the environment cursor for the duration of `body`.  The previous
    /// cursor is put back on every exit path of `body`.
    fn with_environment<T>(
        &mut self,
        environment: EnvRef<'a>,
        body: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous: EnvRef<'a> = mem::replace(&mut self.environment, environment);
        let result: T = body(self);
        self.environment = previous;
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &'a Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value: Value<'a> = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value: Value<'a> = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(name.lexeme, value);
            }

            Stmt::Block(statements) => {
                debug!("Entering block with {} statements", statements.len());

                let environment = Environment::child_of(&self.environment);
                return self.execute_block(statements, environment);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function = LoxFunction::new(declaration, Rc::clone(&self.environment), false);

                self.environment.borrow_mut().define(
                    declaration.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
            }

            Stmt::Return { value, .. } => {
                let value: Value<'a> = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.declare_class(name, superclass.as_ref(), methods)?,
        }

        Ok(Flow::Normal)
    }

    fn declare_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [FunctionDecl<'a>],
    ) -> Result<()> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass<'a>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Callable(Callable::Class(class)) => Some(class),
                _ => {
                    let token: &'a Token<'a> = match expr {
                        Expr::Variable {
                            name: super_name, ..
                        } => *super_name,
                        _ => name,
                    };
                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },
            None => None,
        };

        // Forward binding so methods can refer to the class by name.
        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        let method_env: EnvRef<'a> = match &superclass {
            Some(superclass) => {
                let env = Environment::child_of(&self.environment);
                env.borrow_mut().define(
                    "super",
                    Value::Callable(Callable::Class(Rc::clone(superclass))),
                );
                env
            }
            None => Rc::clone(&self.environment),
        };

        let table: HashMap<&'a str, Rc<LoxFunction<'a>>> = methods
            .iter()
            .map(|method| {
                let is_initializer = method.name.lexeme == INITIALIZER;
                let function = LoxFunction::new(method, Rc::clone(&method_env), is_initializer);
                (method.name.lexeme, Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme, superclass, table);

        info!("Class '{}' defined with {} methods", name.lexeme, methods.len());

        self.environment
            .borrow_mut()
            .assign(name, Value::Callable(Callable::Class(Rc::new(class))))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(s.as_str()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value<'a> = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value<'a> = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value<'a> = self.evaluate(callee)?;

                let mut values: Vec<Value<'a>> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                let Value::Callable(callable) = callee else {
                    return Err(LoxError::runtime(
                        paren,
                        "Can only call functions and classes.",
                    ));
                };

                if values.len() != callable.arity() {
                    return Err(LoxError::runtime(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            values.len()
                        ),
                    ));
                }

                callable.call(self, paren, values)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value: Value<'a> = self.evaluate(value)?;
                instance.set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(
        &mut self,
        operator: &'a Token<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Value<'a>> {
        let right: Value<'a> = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &'a Expr<'a>,
        operator: &'a Token<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Value<'a>> {
        let left: Value<'a> = self.evaluate(left)?;
        let right: Value<'a> = self.evaluate(right)?;

        debug!("Binary {} on {} and {}", operator.lexeme, left, right);

        match operator.token_type {
            TokenType::EQUAL_EQUAL => return Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => return Ok(Value::Bool(left != right)),
            TokenType::PLUS => {
                return match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (Value::String(a), Value::String(b)) => {
                        let mut joined = String::with_capacity(a.len() + b.len());
                        joined.push_str(a);
                        joined.push_str(b);
                        Ok(Value::from(joined.as_str()))
                    }
                    _ => Err(LoxError::runtime(
                        operator,
                        "Operands must be two numbers or two strings.",
                    )),
                };
            }
            _ => {}
        }

        let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
            return Err(LoxError::runtime(operator, "Operands must be numbers."));
        };
        let (a, b) = (*a, *b);

        match operator.token_type {
            TokenType::MINUS => Ok(Value::Number(a - b)),
            TokenType::STAR => Ok(Value::Number(a * b)),
            // IEEE‑754: x/0 is ±Infinity, 0/0 is NaN.
            TokenType::SLASH => Ok(Value::Number(a / b)),
            TokenType::GREATER => Ok(Value::Bool(a > b)),
            TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
            TokenType::LESS => Ok(Value::Bool(a < b)),
            TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
            _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token<'a>) -> Result<Value<'a>> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// `super.method`: the method comes from the superclass captured when the
    /// class was declared, bound to the `this` one frame further in.
    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    ) -> Result<Value<'a>> {
        let Some(distance) = self.resolved_distance(id) else {
            return Err(LoxError::runtime(keyword, "Unresolved 'super'."));
        };

        let superclass = match Environment::lookup_at(&self.environment, distance, "super") {
            Some(Value::Callable(Callable::Class(class))) => class,
            _ => return Err(LoxError::runtime(keyword, "Unresolved 'super'.")),
        };

        let instance = match distance
            .checked_sub(1)
            .and_then(|d| Environment::lookup_at(&self.environment, d, "this"))
        {
            Some(Value::Instance(instance)) => instance,
            _ => return Err(LoxError::runtime(keyword, "Unresolved 'this'.")),
        };

        let Some(function) = superclass.find_method(method.lexeme) else {
            return Err(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            ));
        };

        Ok(Value::Callable(Callable::Function(Rc::new(
            function.bind(instance),
        ))))
    }
}
