//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime) convert their failure
//! modes into one of the variants defined here.  This enables a uniform
//! `Result<T>` alias throughout the crate and ergonomic inter‑operation with
//! `anyhow` in the binary, while still preserving line information.
//!
//! A `return` statement is **not** an error and never travels through this
//! type; see [`crate::interpreter::Flow`].
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is either ` at 'lexeme'` or
    /// ` at end`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis failure (invalid `return`/`this`/`super`, duplicate
    /// local, self‑referential initializer, self‑inheriting class).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error.  Aborts the remaining top‑level statements.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error`.  Stored as text so the error stays
    /// `Clone`.
    #[error("I/O error: {0}")]
    Io(String),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl From<io::Error> for LoxError {
    fn from(err: io::Error) -> Self {
        LoxError::Io(err.to_string())
    }
}

/// Renders the ` at 'x'` fragment used by parse and resolve diagnostics.
fn location_of(token: &Token<'_>) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.  The token supplies the
    /// line number reported to the user.
    pub fn runtime<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// Process exit code conventionally associated with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Runtime { .. } => 70,
            LoxError::Io(_) | LoxError::Utf8(_) => 74,
            _ => 65,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
