use std::fmt;

use crate::key::{format_json_pointer, Key};
use crate::node::Observed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// The key was absent before the write.
    Create,
    /// The key was present before the write.
    Replace,
    Delete,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Replace => "replace",
            ChangeType::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutation, reported to the callback right before it is committed.
///
/// `new_value` is set for creates and replaces and holds what is about to be
/// stored: for containers that is the freshly wrapped node, never the raw
/// value. `old_value` is set for replaces and for deletes of present keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub kind: ChangeType,
    /// Dotted path from the root, prefix included.
    pub path: String,
    pub new_value: Option<Observed>,
    pub old_value: Option<Observed>,
    /// Keys from the root to the changed entry, prefix excluded.
    pub steps: Vec<Key>,
}

impl ChangeRecord {
    /// The changed key.
    pub fn key(&self) -> Option<&Key> {
        self.steps.last()
    }

    /// Unambiguous rendering of [`steps`](Self::steps).
    pub fn json_pointer(&self) -> String {
        format_json_pointer(&self.steps)
    }
}
