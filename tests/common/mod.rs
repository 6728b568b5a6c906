#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::error::LoxError;

/// In‑memory `print` sink that can be read after the interpreter is gone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs a whole program, returning what it printed and how it ended.
pub fn run(source: &str) -> (String, Result<(), Vec<LoxError>>) {
    let buffer = SharedBuffer::default();
    let result = rox::run_source(source, Box::new(buffer.clone()));
    (buffer.contents(), result)
}

/// Runs a program that must succeed and returns its printed lines.
pub fn output_of(source: &str) -> Vec<String> {
    let (out, result) = run(source);
    if let Err(errors) = result {
        panic!("program failed: {:?}\noutput so far:\n{}", errors, out);
    }
    out.lines().map(str::to_owned).collect()
}

/// Runs a program that must fail at runtime; returns (output, error).
pub fn runtime_failure(source: &str) -> (String, LoxError) {
    let (out, result) = run(source);
    let mut errors = result.expect_err("program should fail");
    assert_eq!(errors.len(), 1, "runtime failures are reported alone");
    let error = errors.remove(0);
    assert!(
        matches!(error, LoxError::Runtime { .. }),
        "expected runtime error, got {:?}",
        error
    );
    (out, error)
}

/// Runs a program that must be rejected before execution.
pub fn static_errors(source: &str) -> Vec<LoxError> {
    let (out, result) = run(source);
    assert!(out.is_empty(), "nothing may run after a static error");
    result.expect_err("program should be rejected")
}
