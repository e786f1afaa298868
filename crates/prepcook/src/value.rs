// File: src/value.rs
// Purpose: Display, truthiness and loose comparison of template data values

use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operators accepted in conditionals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Comparison {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

/// Convert a value to its rendered text
pub fn to_output(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // Whole floats print without the trailing `.0`
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Convert a value to boolean
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

/// Anything that is not an array or object
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Short type name for diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compare two values with loose semantics.
///
/// Numbers compare numerically and numeric strings coerce against numbers.
/// Two strings compare lexicographically. For ordering, null counts as 0 and
/// booleans as 0/1. Values that cannot be ordered compare false.
pub fn compare(left: &Value, op: Comparison, right: &Value) -> bool {
    match op {
        Comparison::Eq => loose_eq(left, right),
        Comparison::Ne => !loose_eq(left, right),
        Comparison::Gt => loose_cmp(left, right) == Some(Ordering::Greater),
        Comparison::Lt => loose_cmp(left, right) == Some(Ordering::Less),
        Comparison::Ge => matches!(
            loose_cmp(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparison::Le => matches!(
            loose_cmp(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            left == right
        }
        _ => match (as_number(left), as_number(right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

fn loose_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Value::String(l), Value::String(r)) = (left, right) {
        return Some(l.cmp(r));
    }
    as_number(left)?.partial_cmp(&as_number(right)?)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Array(_) | Value::Object(_) => None,
    }
}
