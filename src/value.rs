use std::fmt;
use std::rc::Rc;

use crate::callable::Callable;
use crate::class::Instance;

/// Every runtime value.  Heap objects (strings, callables, instances) are
/// reference counted, so cloning a `Value` never deep‑copies.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Callable(Callable<'a>),
    Instance(Rc<Instance<'a>>),
}

impl<'a> Value<'a> {
    /// `false` and `nil` are falsey; everything else (including `0` and
    /// `""`) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl<'a> From<&str> for Value<'a> {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

/// `nil` equals only `nil`; strings compare by content; callables and
/// instances by identity.  Numbers compare bit for bit, so `NaN` equals
/// itself and `0` differs from `-0`.  Never fails.
impl<'a> PartialEq for Value<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => fmt_number(*n, f),

            Value::String(s) => write!(f, "{}", s),

            Value::Callable(c) => write!(f, "{}", c),

            Value::Instance(i) => write!(f, "{} instance", i.class().name()),
        }
    }
}

/// Integral numbers drop the trailing `.0`; non‑finite values use the
/// `Infinity` / `NaN` spellings.
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" })
    } else {
        // Rust already renders 3.0 as "3" and 3.5 as "3.5".
        write!(f, "{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::from("").is_truthy());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.0).to_string(), "-0");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn equality_never_crosses_kinds() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::Number(1.0), Value::from("1"));
        assert_eq!(Value::from("ab"), Value::from("ab"));
    }

    #[test]
    fn numbers_compare_bit_for_bit() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Number(0.0), Value::Number(-0.0));
        assert_eq!(Value::Number(0.1 + 0.2), Value::Number(0.1 + 0.2));
    }
}
