#![cfg(feature = "serde")]

use std::cell::RefCell;
use std::rc::Rc;

use observe_tree::replay::{replay, ReplayError};
use serde_json::{json, Value};

/// Runs `script`, returning the records handed out and the outcome.
fn run(script: &str) -> (Vec<Value>, Result<(), ReplayError>) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lines);
    let result = replay(script, move |line| sink.borrow_mut().push(line));
    let records = lines
        .borrow()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (records, result)
}

fn records(script: Value) -> Vec<Value> {
    let (records, result) = run(&script.to_string());
    result.unwrap();
    records
}

#[test]
fn replay_prints_records_in_commit_order() {
    let out = records(json!({
        "root": {},
        "ops": [
            {"op": "set", "path": ["a"], "value": 1},
            {"op": "set", "path": ["a"], "value": 2},
            {"op": "delete", "path": ["a"]},
        ]
    }));
    assert_eq!(
        out,
        vec![
            json!({"type": "create", "path": ".a", "newValue": 1.0}),
            json!({"type": "replace", "path": ".a", "newValue": 2.0, "oldValue": 1.0}),
            json!({"type": "delete", "path": ".a", "oldValue": 2.0}),
        ]
    );
}

#[test]
fn replay_walks_into_written_containers() {
    let out = records(json!({
        "root": {"todos": []},
        "prefix": "state",
        "ops": [
            {"op": "set", "path": ["todos", 0], "value": {"title": "a"}},
            {"op": "set", "path": ["todos", 0, "done"], "value": true},
            {"op": "delete", "path": ["todos", 0, "title"]},
        ]
    }));
    assert_eq!(out.len(), 3);
    assert_eq!(out[0]["path"], "state.todos.0");
    assert_eq!(out[0]["newValue"], json!({"title": "a"}));
    assert_eq!(out[1], json!({"type": "create", "path": "state.todos.0.done", "newValue": true}));
    assert_eq!(out[2], json!({"type": "delete", "path": "state.todos.0.title", "oldValue": "a"}));
}

#[test]
fn replay_stops_at_policy_violations() {
    let (out, result) = run(&json!({
        "root": {"list": [1]},
        "ops": [
            {"op": "set", "path": ["list", 1], "value": 2},
            {"op": "set", "path": ["list", "length"], "value": 1.5},
            {"op": "set", "path": ["list", 3], "value": 4},
        ]
    })
    .to_string());
    // Records of ops that landed before the failure are still handed out.
    assert_eq!(out, vec![json!({"type": "create", "path": ".list.1", "newValue": 2.0})]);
    let err = result.unwrap_err();
    assert!(matches!(err, ReplayError::Policy { op: 1, .. }));
    assert_eq!(err.to_string(), "op 1: invalid array length");
}

#[test]
fn replay_truncates_sequences_through_length() {
    let out = records(json!({
        "root": {"list": [1, 2, 3]},
        "ops": [
            {"op": "set", "path": ["list", "length"], "value": 0},
            {"op": "set", "path": ["list", 0], "value": "a"},
        ]
    }));
    assert_eq!(
        out,
        vec![
            json!({"type": "replace", "path": ".list.length", "newValue": 0.0, "oldValue": 3.0}),
            json!({"type": "create", "path": ".list.0", "newValue": "a"}),
        ]
    );
}

#[test]
fn replay_treats_huge_indices_as_names() {
    let out = records(json!({
        "root": [],
        "ops": [
            {"op": "set", "path": [18446744073709551615u64], "value": 1},
            {"op": "set", "path": [4294967295u64], "value": 2},
            {"op": "set", "path": [0], "value": 3},
        ]
    }));
    assert_eq!(out.len(), 3);
    assert_eq!(out[0]["path"], ".18446744073709551615");
    assert_eq!(out[1]["path"], ".4294967295");
    assert_eq!(out[2]["path"], ".0");
}

#[test]
fn replay_rejects_malformed_scripts() {
    let (out, result) = run(r#"{"root": {}, "ops": [{"op": "move"}]}"#);
    assert!(out.is_empty());
    assert!(matches!(result.unwrap_err(), ReplayError::Script(_)));
}
