//! Raw value model.
//!
//! `Value` can express every kind of candidate a caller may try to put into
//! an observed tree, including the ones the classifier turns away (boxed
//! primitives, class instances, `Undefined`). Only plain mappings, sequences
//! and dates become nodes; only primitives and `Null` become leaves.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Plain keyed mapping, iterated in insertion order.
pub type Map = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Symbol(Symbol),
    BigInt(i128),
    Object(Map),
    /// Plain sequence. An `Undefined` element is a hole.
    Array(Vec<Value>),
    Date(Date),
    /// Wrapped primitive object (`new String("x")` and friends).
    Boxed(Boxed),
    /// Object of any class other than the plain mapping, sequence and date
    /// classes, subclasses of those included.
    Instance(Instance),
}

impl Value {
    /// Builds a plain mapping from `(key, value)` pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a plain sequence.
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the variant, used in log fields.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::BigInt(_) => "bigint",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Date(_) => "date",
            Value::Boxed(_) => "boxed",
            Value::Instance(_) => "instance",
        }
    }

    /// Splits off primitives. Everything that is not a primitive or `Null`
    /// comes back unchanged in `Err`.
    pub fn into_primitive(self) -> Result<Primitive, Value> {
        match self {
            Value::Null => Ok(Primitive::Null),
            Value::Bool(b) => Ok(Primitive::Bool(b)),
            Value::Number(n) => Ok(Primitive::Number(n)),
            Value::String(s) => Ok(Primitive::String(s)),
            Value::Symbol(s) => Ok(Primitive::Symbol(s)),
            Value::BigInt(n) => Ok(Primitive::BigInt(n)),
            other => Err(other),
        }
    }
}

/// An indecomposable value stored as a leaf of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Symbol(Symbol),
    BigInt(i128),
}

impl Primitive {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::String(s) => Value::String(s),
            Primitive::Symbol(s) => Value::Symbol(s),
            Primitive::BigInt(n) => Value::BigInt(n),
        }
    }
}

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique symbol. Two symbols are equal only if one is a clone of the other,
/// whatever their descriptions.
#[derive(Debug, Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Some(Arc::from(description.into())),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or_default())
    }
}

/// Date-like scalar holder. `time` is `None` for an invalid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    time: Option<DateTime<Utc>>,
}

impl Date {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { time: Some(time) }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Out-of-range timestamps produce an invalid date.
    pub fn from_timestamp_millis(millis: i64) -> Self {
        Self {
            time: DateTime::from_timestamp_millis(millis),
        }
    }

    pub fn invalid() -> Self {
        Self { time: None }
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    pub fn timestamp_millis(&self) -> Option<i64> {
        self.time.map(|t| t.timestamp_millis())
    }

    pub fn is_valid(&self) -> bool {
        self.time.is_some()
    }
}

/// Wrapped primitive object, carrying the primitive it wraps.
#[derive(Debug, Clone, PartialEq)]
pub enum Boxed {
    String(String),
    Number(f64),
    Boolean(bool),
    Symbol(Symbol),
    BigInt(i128),
}

impl Boxed {
    pub fn class_name(&self) -> &'static str {
        match self {
            Boxed::String(_) => "String",
            Boxed::Number(_) => "Number",
            Boxed::Boolean(_) => "Boolean",
            Boxed::Symbol(_) => "Symbol",
            Boxed::BigInt(_) => "BigInt",
        }
    }

    pub fn unbox(&self) -> Primitive {
        match self {
            Boxed::String(s) => Primitive::String(s.clone()),
            Boxed::Number(n) => Primitive::Number(*n),
            Boxed::Boolean(b) => Primitive::Bool(*b),
            Boxed::Symbol(s) => Primitive::Symbol(s.clone()),
            Boxed::BigInt(n) => Primitive::BigInt(*n),
        }
    }
}

/// Object of a named class with its own enumerable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: String,
    fields: Map,
}

impl Instance {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn fields(&self) -> &Map {
        &self.fields
    }
}

/// What an object inherits from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prototype {
    Null,
    Object,
    Array,
    Date,
    Class(String),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Value::Date(d)
    }
}

impl From<Boxed> for Value {
    fn from(b: Boxed) -> Self {
        Value::Boxed(b)
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Value::Instance(i)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Object(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}
