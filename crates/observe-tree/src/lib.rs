//! Deep mutation observation over plain data trees.
//!
//! [`observe_tree`] wraps a plain mapping, sequence or date into an
//! [`ObservedNode`]. Reads go straight to the data. Every write and delete,
//! at any depth, is checked against the admissible values (see
//! [`classify`](classify::classify)), wraps containers it brings along, and is
//! reported to a single callback as a [`ChangeRecord`] just before it lands.
//!
//! Nodes are explicit facades: the tree is reached only through
//! [`ObservedNode::get`], [`ObservedNode::set`], [`ObservedNode::delete`] and
//! friends, never through the raw containers.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use observe_tree::{observe_tree, ChangeType, Date, Instance, Value};
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&log);
//! let tree = observe_tree(Value::object::<&str, Value, _>([]), move |r| {
//!     sink.borrow_mut().push(r);
//! }, "").unwrap();
//!
//! tree.set("b", Value::object::<&str, Value, _>([])).unwrap();
//! let b = tree.get("b").unwrap().into_node().unwrap();
//! b.set("c", "x").unwrap();
//! assert_eq!(log.borrow()[1].path, ".b.c");
//! assert_eq!(log.borrow()[1].kind, ChangeType::Create);
//!
//! assert!(tree.set("d", Date::now()).is_ok());
//! let err = tree.set("e", Instance::new("Map")).unwrap_err();
//! assert_eq!(err.to_string(), "setting object of class Map disallowed");
//! ```

pub mod classify;
pub mod error;
#[cfg(feature = "serde")]
pub mod json;
pub mod key;
pub mod node;
pub mod record;
#[cfg(feature = "serde")]
pub mod replay;
pub mod value;

pub use classify::{classify, is_leaf, Classification, Rejection, WrappedKind};
pub use error::PolicyViolation;
pub use key::Key;
pub use node::{observe_tree, NodeKind, Observed, ObservedNode, PropertyDescriptor};
pub use record::{ChangeRecord, ChangeType};
pub use value::{Boxed, Date, Instance, Map, Primitive, Prototype, Symbol, Value};
