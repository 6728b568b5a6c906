pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use std::io::Write;

use log::info;

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

/// Scans `source`, returning every token (ending in `EOF`) or every lex
/// error.
pub fn scan(source: &str) -> Result<Vec<Token<'_>>, Vec<LoxError>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

/// Full pipeline: scan → parse → resolve → interpret, printing to `out`.
///
/// Static errors (lex, parse, resolve) are all returned together and nothing
/// runs.  A runtime error stops the program and is returned alone.
pub fn run_source(source: &str, out: Box<dyn Write>) -> Result<(), Vec<LoxError>> {
    let tokens = scan(source)?;
    let statements = Parser::new(&tokens).parse()?;

    let mut interpreter = Interpreter::with_output(out);
    Resolver::new(&mut interpreter).resolve(&statements)?;

    info!("Static passes succeeded, interpreting");

    interpreter.interpret(&statements).map_err(|e| vec![e])
}
