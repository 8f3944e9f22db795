//! Value classification: what may enter an observed tree.
//!
//! Admissible are `Null`, primitives, and plain mappings, sequences and dates.
//! Boxed primitives are refused because they can carry properties of their
//! own, and other class instances because the tree has to stay a plain
//! object graph. Convert instances into a plain [`Value::Object`] first.

use std::fmt;

use thiserror::Error;

use crate::value::{Boxed, Value};

/// How an admissible value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Leaf,
    Container,
}

/// The primitive kinds whose wrapper objects are recognised as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrappedKind {
    String,
    Number,
    Boolean,
    Symbol,
}

impl fmt::Display for WrappedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WrappedKind::String => "string",
            WrappedKind::Number => "number",
            WrappedKind::Boolean => "boolean",
            WrappedKind::Symbol => "symbol",
        })
    }
}

/// Why a value was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("undefined")]
    Undefined,
    #[error("wrapped {0}")]
    Wrapped(WrappedKind),
    #[error("object of class {0}")]
    ObjectOfClass(String),
}

/// `true` for values that cannot be decomposed further.
pub fn is_leaf(value: &Value) -> bool {
    matches!(
        value,
        Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Symbol(_)
            | Value::BigInt(_)
    )
}

/// Classifies `value` without looking at its children.
pub fn classify(value: &Value) -> Result<Classification, Rejection> {
    match value {
        Value::Undefined => Err(Rejection::Undefined),
        Value::Boxed(boxed) => Err(match boxed {
            Boxed::String(_) => Rejection::Wrapped(WrappedKind::String),
            Boxed::Number(_) => Rejection::Wrapped(WrappedKind::Number),
            Boxed::Boolean(_) => Rejection::Wrapped(WrappedKind::Boolean),
            Boxed::Symbol(_) => Rejection::Wrapped(WrappedKind::Symbol),
            // Only the four classic wrappers are recognised.
            Boxed::BigInt(_) => Rejection::ObjectOfClass(boxed.class_name().to_string()),
        }),
        Value::Instance(instance) => Err(Rejection::ObjectOfClass(
            instance.class_name().to_string(),
        )),
        Value::Object(_) | Value::Array(_) | Value::Date(_) => Ok(Classification::Container),
        _ => Ok(Classification::Leaf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Date, Instance, Symbol};

    #[test]
    fn primitives_and_null_are_leaves() {
        for v in [
            Value::Null,
            Value::from(true),
            Value::from(1.5),
            Value::from("s"),
            Value::Symbol(Symbol::new("s")),
            Value::BigInt(10),
        ] {
            assert!(is_leaf(&v), "{v:?}");
            assert_eq!(classify(&v), Ok(Classification::Leaf));
        }
    }

    #[test]
    fn undefined_is_a_leaf_but_not_admissible() {
        assert!(is_leaf(&Value::Undefined));
        assert_eq!(classify(&Value::Undefined), Err(Rejection::Undefined));
    }

    #[test]
    fn plain_containers_need_wrapping() {
        for v in [
            Value::object::<&str, Value, _>([]),
            Value::array::<Value, _>([]),
            Value::Date(Date::now()),
        ] {
            assert!(!is_leaf(&v));
            assert_eq!(classify(&v), Ok(Classification::Container));
        }
    }

    #[test]
    fn wrapped_primitives_name_their_kind() {
        let cases = [
            (Boxed::String("x".into()), "wrapped string"),
            (Boxed::Number(1.0), "wrapped number"),
            (Boxed::Boolean(false), "wrapped boolean"),
            (Boxed::Symbol(Symbol::anonymous()), "wrapped symbol"),
            (Boxed::BigInt(1), "object of class BigInt"),
        ];
        for (boxed, reason) in cases {
            let v = Value::Boxed(boxed);
            assert!(!is_leaf(&v));
            assert_eq!(classify(&v).unwrap_err().to_string(), reason);
        }
    }

    #[test]
    fn instances_name_their_class() {
        let err = classify(&Value::Instance(Instance::new("Map"))).unwrap_err();
        assert_eq!(err, Rejection::ObjectOfClass("Map".into()));
        assert_eq!(err.to_string(), "object of class Map");
    }
}
