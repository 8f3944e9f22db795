//! Scripted mutations over an observed tree, one JSON record per change.
//!
//! Backs the `observe-replay` binary:
//!
//! ```json
//! {
//!   "root": {"todos": []},
//!   "prefix": "",
//!   "ops": [
//!     {"op": "set", "path": ["todos", 0], "value": {"title": "a"}},
//!     {"op": "delete", "path": ["todos", 0, "title"]}
//!   ]
//! }
//! ```

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::error::PolicyViolation;
use crate::key::Key;
use crate::node::{observe_tree, ObservedNode};
use crate::value::Value;

#[derive(Debug, Deserialize)]
pub struct Script {
    pub root: serde_json::Value,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub ops: Vec<Op>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Op {
    Set {
        path: Vec<Step>,
        value: serde_json::Value,
    },
    Delete {
        path: Vec<Step>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Index(usize),
    Name(String),
}

impl From<Step> for Key {
    fn from(step: Step) -> Self {
        match step {
            Step::Index(idx) => Key::from(idx),
            Step::Name(name) => Key::from(name),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("op {op}: {source}")]
    Policy {
        op: usize,
        #[source]
        source: PolicyViolation,
    },
    #[error("root: {0}")]
    Root(PolicyViolation),
    #[error("op {0}: empty path")]
    EmptyPath(usize),
    #[error("op {op}: no container at {pointer}")]
    NotContainer { op: usize, pointer: String },
}

/// Runs `input`, handing each record to `on_line` as one JSON line the
/// moment it is delivered.
///
/// Ops run in order and stop at the first failure; records of the ops that
/// landed before it have already been handed out.
pub fn replay<F>(input: &str, on_line: F) -> Result<(), ReplayError>
where
    F: Fn(String) + 'static,
{
    let script: Script = serde_json::from_str(input)?;
    let root = observe_tree(
        Value::from(script.root),
        move |record| match serde_json::to_string(&record) {
            Ok(line) => on_line(line),
            Err(err) => warn!(path = %record.path, %err, "failed to serialize record"),
        },
        script.prefix,
    )
    .map_err(ReplayError::Root)?;

    for (idx, op) in script.ops.into_iter().enumerate() {
        run_op(&root, idx, op)?;
    }
    Ok(())
}

fn run_op(root: &ObservedNode, idx: usize, op: Op) -> Result<(), ReplayError> {
    let (path, value) = match op {
        Op::Set { path, value } => (path, Some(value)),
        Op::Delete { path } => (path, None),
    };
    let mut steps: Vec<Key> = path.into_iter().map(Key::from).collect();
    let key = steps.pop().ok_or(ReplayError::EmptyPath(idx))?;
    let target = root
        .find(&steps)
        .and_then(|found| found.into_node())
        .ok_or_else(|| ReplayError::NotContainer {
            op: idx,
            pointer: crate::key::format_json_pointer(&steps),
        })?;

    let result = match value {
        Some(value) => target.set(key, Value::from(value)),
        None => target.delete(key),
    };
    result.map_err(|source| ReplayError::Policy { op: idx, source })
}
