//! JSON interop.
//!
//! Every JSON document is admissible and converts into [`Value`] directly.
//! The other direction is lossy where JSON has no counterpart: dates become
//! RFC 3339 strings (`null` when invalid), bigints decimal strings, symbols
//! their description, holes and `Undefined` become `null`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::node::{Observed, ObservedNode};
use crate::record::{ChangeRecord, ChangeType};
use crate::value::{Primitive, Value};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Symbol(sym) => sym.description().serialize(serializer),
            Value::BigInt(n) => serializer.serialize_str(&n.to_string()),
            Value::Object(map) => serializer.collect_map(map),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Date(date) => date.time().map(|t| t.to_rfc3339()).serialize(serializer),
            Value::Boxed(boxed) => boxed.unbox().serialize(serializer),
            Value::Instance(instance) => serializer.collect_map(instance.fields()),
        }
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Primitive::Null => serializer.serialize_unit(),
            Primitive::Bool(b) => serializer.serialize_bool(*b),
            Primitive::Number(n) => serializer.serialize_f64(*n),
            Primitive::String(s) => serializer.serialize_str(s),
            Primitive::Symbol(sym) => sym.description().serialize(serializer),
            Primitive::BigInt(n) => serializer.serialize_str(&n.to_string()),
        }
    }
}

impl Serialize for ObservedNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl Serialize for Observed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Observed::Leaf(p) => p.serialize(serializer),
            Observed::Node(n) => n.serialize(serializer),
        }
    }
}

impl Serialize for ChangeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `{"type", "path", "newValue"?, "oldValue"?}`
impl Serialize for ChangeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + usize::from(self.new_value.is_some()) + usize::from(self.old_value.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", &self.kind)?;
        map.serialize_entry("path", &self.path)?;
        if let Some(new_value) = &self.new_value {
            map.serialize_entry("newValue", new_value)?;
        }
        if let Some(old_value) = &self.old_value {
            map.serialize_entry("oldValue", old_value)?;
        }
        map.end()
    }
}
