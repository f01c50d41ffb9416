//! Container keys and their normalization.
//!
//! Text keys are stored in symbolic form, so `"port"` and `Key::sym("port")`
//! address the same entry. Every other key kind is kept as supplied.

use std::fmt;
use std::ops::Range;

use indexmap::IndexMap;

/// A key in a [`ConfigMap`](crate::ConfigMap) or a raw [`Value::Map`](crate::Value::Map).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Text as supplied by the caller; never stored in a container.
    Text(String),
    /// Canonical form of a text key.
    Symbol(String),
    Int(i64),
    Bool(bool),
    Range(Range<i64>),
    Null,
}

impl Key {
    /// Build a symbolic key directly.
    pub fn sym(name: impl Into<String>) -> Self {
        Key::Symbol(name.into())
    }

    /// Canonicalize the key. Text becomes a symbol; everything else passes through.
    pub fn normalize(self) -> Self {
        match self {
            Key::Text(s) => Key::Symbol(s),
            other => other,
        }
    }

    /// The textual name of a text or symbolic key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Text(s) | Key::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Whether an attribute-style accessor exists for this key.
    ///
    /// Only symbolic keys whose name doesn't start with a digit get one.
    pub fn has_accessor(&self) -> bool {
        match self {
            Key::Symbol(s) => is_accessor_name(s),
            _ => false,
        }
    }

    /// Rendering used for serialized map keys: the bare name for text and
    /// symbols, the display form otherwise.
    pub fn to_name(&self) -> String {
        match self {
            Key::Text(s) | Key::Symbol(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Serialized names of `keys`, in order.
///
/// Fails when two distinct keys render to the same name, such as `:1` and `1`.
pub(crate) fn serialized_names<'a, I>(keys: I) -> Result<Vec<String>, String>
where
    I: IntoIterator<Item = &'a Key>,
{
    let mut seen: IndexMap<String, &Key> = IndexMap::new();
    for key in keys {
        let name = key.to_name();
        if let Some(previous) = seen.get(&name) {
            return Err(format!(
                "keys {} and {} both serialize as {:?}",
                previous, key, name
            ));
        }
        seen.insert(name, key);
    }
    Ok(seen.into_keys().collect())
}

pub(crate) fn is_accessor_name(name: &str) -> bool {
    name.chars().next().map_or(false, |c| !c.is_ascii_digit())
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Text(s) => write!(f, "{:?}", s),
            Key::Symbol(s) => write!(f, ":{}", s),
            Key::Int(i) => write!(f, "{}", i),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Range(r) => write!(f, "{}..{}", r.start, r.end),
            Key::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Text(s.clone())
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<Range<i64>> for Key {
    fn from(r: Range<i64>) -> Self {
        Key::Range(r)
    }
}
