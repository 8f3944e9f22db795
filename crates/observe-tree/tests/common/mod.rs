#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use observe_tree::{observe_tree, ChangeRecord, ObservedNode, Value};

pub type Log = Rc<RefCell<Vec<ChangeRecord>>>;

/// Installs a test subscriber once; `RUST_LOG=observe_tree=trace` shows the
/// wrap/notify trail of a failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn observed_with_prefix(root: Value, prefix: &str) -> (ObservedNode, Log) {
    init_tracing();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let tree = observe_tree(root, move |record| sink.borrow_mut().push(record), prefix)
        .expect("root must be observable");
    (tree, log)
}

pub fn observed(root: Value) -> (ObservedNode, Log) {
    observed_with_prefix(root, "")
}

pub fn empty_object() -> Value {
    Value::object::<&str, Value, _>([])
}
