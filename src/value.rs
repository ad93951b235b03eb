use serde::Serialize;
use std::fmt;

/// Static type of an expression or a function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Bool,
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether a value of type `self` may be passed where `target` is expected.
    /// `Int` widens to `Float`; nothing else converts.
    pub fn assignable_to(self, target: Type) -> bool {
        self == target || (self == Type::Int && target == Type::Float)
    }

    /// Result type of `+ - * %` over two numeric operands.
    pub fn promote(self, other: Type) -> Type {
        if self == Type::Int && other == Type::Int {
            Type::Int
        } else {
            Type::Float
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Bool => f.write_str("boolean"),
        }
    }
}

/// Runtime value produced by a compiled expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Bool(_) => Type::Bool,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; ints widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps the fractional part: 111.0 rather than 111
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Numeric comparison. Ints compare exactly, anything involving a float
/// compares as `f64` without tolerance. Non-numeric operands never match.
pub fn cmp_numbers<F>(a: &Value, b: &Value, pred_on_ord: F) -> bool
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    match (a, b) {
        (Value::Int(ia), Value::Int(ib)) => pred_on_ord(ia.cmp(ib)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(da), Some(db)) => da.partial_cmp(&db).map(pred_on_ord).unwrap_or(false),
            _ => false,
        },
    }
}

/// Equality for `==` / `!=`: numeric across int and float, exact for booleans.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(ba), Value::Bool(bb)) => ba == bb,
        _ => cmp_numbers(a, b, |o| o.is_eq()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn display_matches_demo_output() {
        assert_eq!(Value::Int(4).to_string(), "4");
        assert_eq!(Value::Float(2.75).to_string(), "2.75");
        assert_eq!(Value::Float(111.0).to_string(), "111.0");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }

    #[test]
    fn json_is_untagged() {
        assert_eq!(Value::Int(111).to_json(), json!(111));
        assert_eq!(Value::Float(2.75).to_json(), json!(2.75));
        assert_eq!(Value::Bool(true).to_json(), json!(true));
    }

    #[test]
    fn mixed_equality() {
        assert!(values_equal(&Value::Int(3), &Value::Float(3.0)));
        assert!(!values_equal(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
        assert!(!values_equal(&Value::Bool(true), &Value::Int(1)));
    }

    #[test]
    fn widening() {
        assert!(Type::Int.assignable_to(Type::Float));
        assert!(!Type::Float.assignable_to(Type::Int));
        assert!(!Type::Bool.assignable_to(Type::Int));
        assert_eq!(Type::Int.promote(Type::Float), Type::Float);
    }
}
