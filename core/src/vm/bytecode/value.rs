use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Chunk;
use super::table::Table;

/// A compiled function: its own chunk plus the name it was defined under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub arity: u8,
    pub chunk: Chunk,
}

/// One animation step list, built from a `game` block entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub emoji: String,
    pub action: String,
    pub distance: u32,
    pub repeat: u32,
    pub speed: u32,
}

/// A host command line. Invoking a global bound to one hands the line to
/// the shell intrinsic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub line: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Function(Rc<Function>),
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<Table>>),
    Command(Rc<Command>),
    Animation(Rc<Animation>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn map(table: Table) -> Self {
        Value::Map(Rc::new(RefCell::new(table)))
    }

    pub fn command(line: impl Into<String>) -> Self {
        Value::Command(Rc::new(Command { line: line.into() }))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Command(_) => "command",
            Value::Animation(_) => "animation",
        }
    }

    /// Only `null` and `false` are falsey.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Null | Value::Boolean(false))
    }

    /// Numeric conversion used by `name {num}`. Strings convert from their
    /// longest numeric prefix; anything unparseable becomes `0`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(s) => parse_leading_number(s),
            Value::Boolean(true) => 1.0,
            _ => 0.0,
        }
    }

    /// Identity of two constants for pool deduplication. Numbers compare by
    /// bit pattern, so `0.0` and `-0.0` stay distinct.
    pub(crate) fn same_constant(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Command(a), Value::Command(b)) => a == b,
            (Value::Animation(a), Value::Animation(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::String(s) => f.write_str(s),
            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(table) => {
                let table = table.borrow();
                let mut keys: Vec<_> = table.iter().collect();
                keys.sort_by(|a, b| a.0.cmp(b.0));
                f.write_str("{")?;
                for (i, (key, value)) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Command(cmd) => write!(f, "<command {}>", cmd.line),
            Value::Animation(anim) => write!(
                f,
                "<animation {} {} {}x{} @{}>",
                anim.emoji, anim.action, anim.distance, anim.repeat, anim.speed
            ),
        }
    }
}

/// `[+-]digits[.digits][(e|E)[+-]digits]` taken from the start of `text`,
/// after leading whitespace.
fn parse_leading_number(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_number_prefix() {
        assert_eq!(parse_leading_number("42"), 42.0);
        assert_eq!(parse_leading_number("  3.5 apples"), 3.5);
        assert_eq!(parse_leading_number("-2e3x"), -2000.0);
        assert_eq!(parse_leading_number("7e"), 7.0);
        assert_eq!(parse_leading_number("abc"), 0.0);
        assert_eq!(parse_leading_number(""), 0.0);
        assert_eq!(parse_leading_number("-"), 0.0);
    }

    #[test]
    fn numbers_print_without_trailing_zero() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
    }

    #[test]
    fn containers_print_their_elements() {
        let list = Value::list(vec![Value::Number(1.0), Value::String(Rc::from("a"))]);
        assert_eq!(list.to_string(), "[1, a]");
        assert_eq!(Value::list(Vec::new()).to_string(), "[]");

        let mut table = Table::new();
        table.set(Rc::from("b"), Value::Boolean(true));
        table.set(Rc::from("a"), Value::Number(1.0));
        table.set(Rc::from("c"), Value::list(vec![Value::Null]));
        let map = Value::map(table);
        assert_eq!(map.to_string(), "{a: 1, b: true, c: [null]}");
        assert_eq!(map.type_name(), "map");
    }

    #[test]
    fn containers_compare_by_identity() {
        let list = Value::list(vec![Value::Number(1.0)]);
        assert_eq!(list, list.clone());
        assert_ne!(list, Value::list(vec![Value::Number(1.0)]));
    }
}
