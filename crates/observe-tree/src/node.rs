//! Tree interceptor.
//!
//! [`observe_tree`] turns a raw container into an [`ObservedNode`]. Every
//! container nested in it, and every container written into it later, is
//! wrapped into a node of its own at the moment it enters the tree. Writes go
//! through classification, wrapping, notification and only then commit.
//!
//! Nodes are shared handles: a clone refers to the same container, and the
//! handle carried in a [`ChangeRecord`] is the node that ends up in the tree.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::classify::{classify, Rejection};
use crate::error::PolicyViolation;
use crate::key::{child_path, Key, MAX_INDEX};
use crate::record::{ChangeRecord, ChangeType};
use crate::value::{Date, Primitive, Prototype, Value};

/// Element count of sequences. Writable, never removable.
const LENGTH: &str = "length";

type Callback = Rc<dyn Fn(ChangeRecord)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    Date,
}

/// A value as stored in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Leaf(Primitive),
    Node(ObservedNode),
}

impl Observed {
    pub fn as_leaf(&self) -> Option<&Primitive> {
        match self {
            Observed::Leaf(p) => Some(p),
            Observed::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&ObservedNode> {
        match self {
            Observed::Node(n) => Some(n),
            Observed::Leaf(_) => None,
        }
    }

    pub fn into_node(self) -> Option<ObservedNode> {
        match self {
            Observed::Node(n) => Some(n),
            Observed::Leaf(_) => None,
        }
    }

    /// Deep copy as a raw value.
    pub fn to_value(&self) -> Value {
        match self {
            Observed::Leaf(p) => Value::from(p.clone()),
            Observed::Node(n) => n.to_value(),
        }
    }
}

/// Attribute changes requested through [`ObservedNode::define_property`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

/// Interception facade over one container.
#[derive(Clone)]
pub struct ObservedNode {
    inner: Rc<Inner>,
}

struct Inner {
    kind: NodeKind,
    path: String,
    steps: Vec<Key>,
    callback: Callback,
    storage: RefCell<Storage>,
}

enum Storage {
    Object(IndexMap<String, Observed>),
    /// Sparse: indices below `length` without an entry are holes.
    Array {
        items: BTreeMap<usize, Observed>,
        length: usize,
        props: IndexMap<String, Observed>,
    },
    Date {
        date: Date,
        props: IndexMap<String, Observed>,
    },
}

/// Wraps `root` and reports every later mutation below it to `callback`.
///
/// `prefix` is the path of the root itself; children are at
/// `prefix + "." + key`. Pass `""` for paths like `.a.b`.
///
/// The root has to be a plain mapping, sequence or date, and everything
/// nested in it has to be admissible.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use observe_tree::{observe_tree, ChangeType, Value};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let tree = observe_tree(Value::object::<&str, Value, _>([]), move |record| {
///     sink.borrow_mut().push((record.kind, record.path));
/// }, "").unwrap();
///
/// tree.set("a", 1).unwrap();
/// tree.set("a", 2).unwrap();
/// tree.delete("a").unwrap();
///
/// assert_eq!(*seen.borrow(), vec![
///     (ChangeType::Create, ".a".to_string()),
///     (ChangeType::Replace, ".a".to_string()),
///     (ChangeType::Delete, ".a".to_string()),
/// ]);
/// ```
pub fn observe_tree<F>(
    root: Value,
    callback: F,
    prefix: impl Into<String>,
) -> Result<ObservedNode, PolicyViolation>
where
    F: Fn(ChangeRecord) + 'static,
{
    let callback: Callback = Rc::new(callback);
    let prefix = prefix.into();
    match adopt(root, &callback, prefix, Vec::new()) {
        Ok(Observed::Node(node)) => {
            debug!(path = %node.path(), kind = ?node.kind(), "observing tree");
            Ok(node)
        }
        Ok(Observed::Leaf(_)) => Err(PolicyViolation::ObservingLeaf),
        Err(reason) => {
            debug!(%reason, "refused to observe root");
            Err(PolicyViolation::ObservingValue(reason))
        }
    }
}

/// Classifies `value` and, for containers, wraps it and everything in it.
/// Nothing is reported: adoption has no effect until the result is stored.
fn adopt(
    value: Value,
    callback: &Callback,
    path: String,
    steps: Vec<Key>,
) -> Result<Observed, Rejection> {
    classify(&value)?;
    let storage = match value {
        Value::Object(map) => {
            let mut entries = IndexMap::with_capacity(map.len());
            for (name, child) in map {
                let key = Key::from(name.as_str());
                let child = adopt(
                    child,
                    callback,
                    child_path(&path, &key),
                    child_steps(&steps, key),
                )?;
                entries.insert(name, child);
            }
            Storage::Object(entries)
        }
        Value::Array(items) => {
            let length = items.len();
            let mut adopted = BTreeMap::new();
            for (idx, child) in items.into_iter().enumerate() {
                if matches!(child, Value::Undefined) {
                    continue;
                }
                let key = Key::Index(idx);
                let child = adopt(
                    child,
                    callback,
                    child_path(&path, &key),
                    child_steps(&steps, key),
                )?;
                adopted.insert(idx, child);
            }
            Storage::Array {
                items: adopted,
                length,
                props: IndexMap::new(),
            }
        }
        Value::Date(date) => Storage::Date {
            date,
            props: IndexMap::new(),
        },
        // Admissible and not a container: a primitive.
        leaf => {
            return leaf
                .into_primitive()
                .map(Observed::Leaf)
                .map_err(|_| Rejection::Undefined)
        }
    };
    let kind = storage.kind();
    trace!(path = %path, ?kind, "wrapped container");
    Ok(Observed::Node(ObservedNode {
        inner: Rc::new(Inner {
            kind,
            path,
            steps,
            callback: Rc::clone(callback),
            storage: RefCell::new(storage),
        }),
    }))
}

fn child_steps(steps: &[Key], key: Key) -> Vec<Key> {
    let mut out = Vec::with_capacity(steps.len() + 1);
    out.extend_from_slice(steps);
    out.push(key);
    out
}

impl ObservedNode {
    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    /// Dotted path of this node, prefix included.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Keys from the root to this node.
    pub fn steps(&self) -> &[Key] {
        &self.inner.steps
    }

    pub fn prototype(&self) -> Prototype {
        match self.kind() {
            NodeKind::Object => Prototype::Object,
            NodeKind::Array => Prototype::Array,
            NodeKind::Date => Prototype::Date,
        }
    }

    /// Time value of a date node.
    pub fn date(&self) -> Option<Date> {
        match &*self.inner.storage.borrow() {
            Storage::Date { date, .. } => Some(*date),
            _ => None,
        }
    }

    /// `true` if both handles guard the same container.
    pub fn ptr_eq(&self, other: &ObservedNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Reads never report and never fail. On sequences `"length"` reads the
    /// element count.
    pub fn get(&self, key: impl Into<Key>) -> Option<Observed> {
        self.inner.storage.borrow().lookup(&key.into())
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.get(key).is_some()
    }

    /// Present keys: sequence elements in index order (holes skipped) before
    /// named entries in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        self.inner.storage.borrow().entries().map(|(k, _)| k).collect()
    }

    pub fn entries(&self) -> Vec<(Key, Observed)> {
        self.inner
            .storage
            .borrow()
            .entries()
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }

    /// Entry count of mappings and dates, `length` of sequences.
    pub fn len(&self) -> usize {
        match &*self.inner.storage.borrow() {
            Storage::Object(map) => map.len(),
            Storage::Array { length, .. } => *length,
            Storage::Date { props, .. } => props.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Follows `steps` down from this node.
    pub fn find(&self, steps: &[Key]) -> Option<Observed> {
        let mut current = Observed::Node(self.clone());
        for step in steps {
            current = current.as_node()?.get(step)?;
        }
        Some(current)
    }

    /// Deep copy as a raw value. Holes come back as `Undefined`. Named
    /// entries of sequences and dates have no raw counterpart and are left
    /// out, as JSON leaves them out.
    pub fn to_value(&self) -> Value {
        match &*self.inner.storage.borrow() {
            Storage::Object(map) => Value::Object(
                map.iter()
                    .map(|(name, v)| (name.clone(), v.to_value()))
                    .collect(),
            ),
            Storage::Array { items, length, .. } => Value::Array(
                (0..*length)
                    .map(|idx| items.get(&idx).map_or(Value::Undefined, Observed::to_value))
                    .collect(),
            ),
            Storage::Date { date, .. } => Value::Date(*date),
        }
    }

    /// Writes `value` at `key`.
    ///
    /// The value is classified (nested content included) and wrapped, the
    /// callback receives a `create` or `replace` record, then the value is
    /// stored. A refused value leaves the node untouched and reports nothing.
    /// Writing past the end of a sequence leaves holes in between.
    ///
    /// Writing `"length"` on a sequence reports a `replace` of the old count
    /// and then truncates or extends it. The new count has to be a whole
    /// number in `0..=MAX_INDEX + 1`.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<(), PolicyViolation> {
        let key = key.into();
        let path = child_path(self.path(), &key);
        let steps = child_steps(self.steps(), key.clone());
        let new_value = adopt(value.into(), &self.inner.callback, path.clone(), steps.clone())
            .map_err(|reason| self.refuse(PolicyViolation::SettingValue(reason)))?;
        if self.kind() == NodeKind::Array
            && key.is_named(LENGTH)
            && array_length(&new_value).is_none()
        {
            return Err(self.refuse(PolicyViolation::InvalidArrayLength));
        }

        let old_value = self.inner.storage.borrow().lookup(&key);
        let kind = if old_value.is_some() {
            ChangeType::Replace
        } else {
            ChangeType::Create
        };
        self.emit(ChangeRecord {
            kind,
            path,
            new_value: Some(new_value.clone()),
            old_value,
            steps,
        });
        self.inner.storage.borrow_mut().store(key, new_value);
        Ok(())
    }

    /// Appends to a sequence; elsewhere this writes the key `len()`.
    pub fn push(&self, value: impl Into<Value>) -> Result<(), PolicyViolation> {
        self.set(Key::from(self.len()), value)
    }

    /// Removes `key`, reporting a `delete` record first. Deleting a sequence
    /// element leaves a hole; later elements keep their indices. Deleting an
    /// absent key still reports, with no old value. The `"length"` of a
    /// sequence cannot be removed.
    pub fn delete(&self, key: impl Into<Key>) -> Result<(), PolicyViolation> {
        let key = key.into();
        if self.kind() == NodeKind::Array && key.is_named(LENGTH) {
            return Err(self.refuse(PolicyViolation::InvalidArrayLength));
        }

        let path = child_path(self.path(), &key);
        let steps = child_steps(self.steps(), key.clone());
        let old_value = self.inner.storage.borrow().lookup(&key);
        self.emit(ChangeRecord {
            kind: ChangeType::Delete,
            path,
            new_value: None,
            old_value,
            steps,
        });
        self.inner.storage.borrow_mut().remove(&key);
        Ok(())
    }

    /// Always fails: plain assignment is the only way to change an entry.
    pub fn define_property(
        &self,
        _key: impl Into<Key>,
        _descriptor: PropertyDescriptor,
    ) -> Result<(), PolicyViolation> {
        Err(self.refuse(PolicyViolation::DefiningProperty))
    }

    /// Always fails: prototypes are fixed once wrapped.
    pub fn set_prototype(&self, _prototype: Prototype) -> Result<(), PolicyViolation> {
        Err(self.refuse(PolicyViolation::SettingPrototype))
    }

    fn emit(&self, record: ChangeRecord) {
        trace!(kind = %record.kind, path = %record.path, "change");
        (self.inner.callback)(record);
    }

    fn refuse(&self, violation: PolicyViolation) -> PolicyViolation {
        debug!(path = %self.path(), %violation, "mutation refused");
        violation
    }
}

impl PartialEq for ObservedNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObservedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedNode")
            .field("kind", &self.inner.kind)
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl Storage {
    fn kind(&self) -> NodeKind {
        match self {
            Storage::Object(_) => NodeKind::Object,
            Storage::Array { .. } => NodeKind::Array,
            Storage::Date { .. } => NodeKind::Date,
        }
    }

    fn lookup(&self, key: &Key) -> Option<Observed> {
        match self {
            Storage::Object(map) => map.get(&*key.as_name()).cloned(),
            Storage::Array {
                items,
                length,
                props,
            } => match key.as_index() {
                Some(idx) => items.get(&idx).cloned(),
                None if key.is_named(LENGTH) => {
                    Some(Observed::Leaf(Primitive::Number(*length as f64)))
                }
                None => props.get(&*key.as_name()).cloned(),
            },
            Storage::Date { props, .. } => props.get(&*key.as_name()).cloned(),
        }
    }

    fn store(&mut self, key: Key, value: Observed) {
        match self {
            Storage::Object(map) => {
                map.insert(key.as_name().into_owned(), value);
            }
            Storage::Array {
                items,
                length,
                props,
            } => match key.as_index() {
                Some(idx) => {
                    items.insert(idx, value);
                    *length = (*length).max(idx + 1);
                }
                None if key.is_named(LENGTH) => {
                    if let Some(new_length) = array_length(&value) {
                        items.retain(|idx, _| *idx < new_length);
                        *length = new_length;
                    }
                }
                None => {
                    props.insert(key.as_name().into_owned(), value);
                }
            },
            Storage::Date { props, .. } => {
                props.insert(key.as_name().into_owned(), value);
            }
        }
    }

    fn remove(&mut self, key: &Key) {
        match self {
            Storage::Object(map) => {
                map.shift_remove(&*key.as_name());
            }
            Storage::Array { items, props, .. } => match key.as_index() {
                Some(idx) => {
                    items.remove(&idx);
                }
                None => {
                    props.shift_remove(&*key.as_name());
                }
            },
            Storage::Date { props, .. } => {
                props.shift_remove(&*key.as_name());
            }
        }
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (Key, &Observed)> + '_> {
        match self {
            Storage::Object(map) => Box::new(map.iter().map(|(name, v)| (Key::from(name), v))),
            Storage::Array { items, props, .. } => Box::new(
                items
                    .iter()
                    .map(|(idx, v)| (Key::Index(*idx), v))
                    .chain(named_entries(props)),
            ),
            Storage::Date { props, .. } => Box::new(named_entries(props)),
        }
    }
}

/// `value` as a sequence length: a whole number no larger than one past the
/// last valid index.
fn array_length(value: &Observed) -> Option<usize> {
    let n = value.as_leaf()?.as_f64()?;
    (n >= 0.0 && n.fract() == 0.0 && n <= (MAX_INDEX + 1) as f64).then_some(n as usize)
}

fn named_entries(
    props: &IndexMap<String, Observed>,
) -> impl Iterator<Item = (Key, &Observed)> + '_ {
    props.iter().map(|(name, v)| (Key::Name(name.clone()), v))
}
