//! Abstract syntax tree produced by [`crate::parser::Parser`].
//!
//! Nodes borrow their tokens from the scanner's token buffer (lifetime `'a`),
//! so the tree is immutable and zero‑copy once built.  Expressions that the
//! resolver annotates (`Variable`, `Assign`, `This`, `Super`) carry an
//! [`ExprId`] which identifies the *lexical site* independently of how many
//! times it is evaluated.

use crate::token::Token;

/// Identity of a resolvable expression site.  Assigned sequentially by the
/// parser; unique within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub usize);

/// A **literal constant** that appears directly in the source code.
///
/// The parser copies the typed value out of the token so evaluation never
/// re‑inspects token kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// `true` / `false`.
    Bool(bool),

    /// The `nil` literal.
    Nil,
}

/// Every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Variable access.
    Variable { id: ExprId, name: &'a Token<'a> },

    /// Assignment expression: `identifier "=" expression`
    Assign {
        id: ExprId,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Function‑, method‑ or constructor call.
    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: &'a Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// `object.property`
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// `object.property = value`
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: &'a Token<'a> },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },
}

/// Named function or method: `IDENT "(" params ")" block`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    pub name: &'a Token<'a>,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<&'a Token<'a>>,

    pub body: Vec<Stmt<'a>>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  `for` loops are desugared
/// by the parser, so this set is closed over the nine runtime forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    /// `print` statement used for output.
    Print(Expr<'a>),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt<'a>>),

    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    /// Function declaration ‑ becomes a first‑class callable value.
    Function(FunctionDecl<'a>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for diagnostics).
        keyword: &'a Token<'a>,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr<'a>>,
    },

    /// `class NAME (< SUPER)? { methods }`.  `superclass` is always an
    /// `Expr::Variable` when present.
    Class {
        name: &'a Token<'a>,
        superclass: Option<Expr<'a>>,
        methods: Vec<FunctionDecl<'a>>,
    },
}
