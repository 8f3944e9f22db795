//! Keys and path strings.
//!
//! Paths are built by appending `.` and the key at each level, with no
//! escaping: `.items.0.name` does not say whether `0` indexes a sequence or
//! names a mapping entry, and a key containing `.` reads as two segments.
//! The structured steps kept next to each path resolve that when needed,
//! see [`format_json_pointer`].

use std::borrow::Cow;
use std::fmt;

/// Largest valid sequence index.
pub const MAX_INDEX: usize = u32::MAX as usize - 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    /// Canonical index strings (`"0"`, `"42"`) become [`Key::Index`], anything
    /// else (`"01"`, `"-1"`, `"1.0"`) a [`Key::Name`].
    pub fn parse(s: &str) -> Key {
        match parse_index(s) {
            Some(idx) => Key::Index(idx),
            None => Key::Name(s.to_string()),
        }
    }

    /// Sequence index addressed by this key, if any.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(idx) => Some(*idx).filter(|idx| *idx <= MAX_INDEX),
            Key::Name(name) => parse_index(name),
        }
    }

    /// The key as a mapping entry name.
    pub fn as_name(&self) -> Cow<'_, str> {
        match self {
            Key::Index(idx) => Cow::Owned(idx.to_string()),
            Key::Name(name) => Cow::Borrowed(name),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, Key::Name(n) if n == name)
    }
}

fn parse_index(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    s.parse::<usize>().ok().filter(|idx| *idx <= MAX_INDEX)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(idx) => write!(f, "{idx}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::parse(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        match parse_index(&s) {
            Some(idx) => Key::Index(idx),
            None => Key::Name(s),
        }
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::parse(s)
    }
}

/// Integers past [`MAX_INDEX`] are names, as their string forms are.
impl From<usize> for Key {
    fn from(idx: usize) -> Self {
        if idx <= MAX_INDEX {
            Key::Index(idx)
        } else {
            Key::Name(idx.to_string())
        }
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

/// Path of `key` under a node whose path is `prefix`.
pub fn child_path(prefix: &str, key: &Key) -> String {
    let mut path = String::with_capacity(prefix.len() + 8);
    path.push_str(prefix);
    path.push('.');
    match key {
        Key::Index(idx) => path.push_str(&idx.to_string()),
        Key::Name(name) => path.push_str(name),
    }
    path
}

/// Escapes one RFC 6901 reference token: `~` becomes `~0`, `/` becomes `~1`.
pub fn escape_component(component: &str) -> Cow<'_, str> {
    if !component.contains(['~', '/']) {
        return Cow::Borrowed(component);
    }
    // `~` first, or the `~` of `~1` would be escaped again.
    Cow::Owned(component.replace('~', "~0").replace('/', "~1"))
}

/// Renders steps as a JSON Pointer. The empty step list is the root, `""`.
pub fn format_json_pointer(steps: &[Key]) -> String {
    let mut out = String::new();
    for step in steps {
        out.push('/');
        out.push_str(&escape_component(&step.as_name()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognises_canonical_indices_only() {
        assert_eq!(Key::parse("0"), Key::Index(0));
        assert_eq!(Key::parse("42"), Key::Index(42));
        assert_eq!(Key::parse("01"), Key::Name("01".into()));
        assert_eq!(Key::parse("-1"), Key::Name("-1".into()));
        assert_eq!(Key::parse("+1"), Key::Name("+1".into()));
        assert_eq!(Key::parse("1.0"), Key::Name("1.0".into()));
        assert_eq!(Key::parse(""), Key::Name("".into()));
        assert_eq!(Key::parse("4294967295"), Key::Name("4294967295".into()));
        assert_eq!(Key::parse("4294967294"), Key::Index(MAX_INDEX));
    }

    #[test]
    fn names_that_look_like_indices_still_address_elements() {
        assert_eq!(Key::Name("3".into()).as_index(), Some(3));
        assert_eq!(Key::Name("length".into()).as_index(), None);
        assert_eq!(Key::Index(7).as_name(), "7");
    }

    #[test]
    fn out_of_range_integers_are_names() {
        assert_eq!(Key::from(MAX_INDEX), Key::Index(MAX_INDEX));
        assert_eq!(Key::from(4294967295usize), Key::Name("4294967295".into()));
        assert_eq!(Key::from(usize::MAX), Key::Name(usize::MAX.to_string()));
        assert_eq!(Key::Index(MAX_INDEX + 1).as_index(), None);
        assert_eq!(Key::Index(usize::MAX).as_index(), None);
        assert_eq!(Key::Index(MAX_INDEX + 1).as_name(), "4294967295");
    }

    #[test]
    fn child_path_appends_without_escaping() {
        assert_eq!(child_path("", &Key::from("a")), ".a");
        assert_eq!(child_path(".a", &Key::Index(0)), ".a.0");
        assert_eq!(child_path("state", &Key::from("x.y")), "state.x.y");
        assert_eq!(child_path("", &Key::from("")), ".");
    }

    #[test]
    fn json_pointer_escapes_tokens() {
        assert_eq!(format_json_pointer(&[]), "");
        assert_eq!(
            format_json_pointer(&[Key::from("a/b"), Key::Index(2), Key::from("c~d")]),
            "/a~1b/2/c~0d"
        );
        assert_eq!(escape_component("plain"), "plain");
    }
}
