//! Dynamic values handed to (and exported from) a configuration container.
//!
//! [`Value`] is the raw, already-parsed input tree. Maps and lists become
//! child containers during construction, [`Opaque`] values are referenced
//! as-is, and everything else is a scalar leaf subject to processing.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::ConfigError;
use crate::key::{serialized_names, Key};
use crate::transform_registry::TransformFn;

/// A raw configuration value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Symbol(String),
    List(Vec<Value>),
    Map(IndexMap<Key, Value>),
    Opaque(Opaque),
}

/// Values that are never processed and never copied, only referenced.
#[derive(Debug, Clone, PartialEq)]
pub enum Opaque {
    Callable(Callable),
    Type(TypeRef),
}

impl Opaque {
    /// Human readable name, used when serializing.
    pub fn name(&self) -> String {
        match self {
            Opaque::Callable(c) => c.name().unwrap_or("<callable>").to_string(),
            Opaque::Type(t) => t.name().to_string(),
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Opaque::Callable(c) => Some(c),
            Opaque::Type(_) => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Opaque::Type(t) => Some(t),
            Opaque::Callable(_) => None,
        }
    }
}

/// A shared one-argument function over values.
///
/// Cloning a `Callable` shares the underlying function.
#[derive(Clone)]
pub struct Callable {
    name: Option<Arc<str>>,
    func: Arc<dyn TransformFn>,
}

impl Callable {
    pub fn new<F>(func: F) -> Self
    where
        F: TransformFn + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: TransformFn + 'static,
    {
        Self {
            name: Some(Arc::from(name.into())),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the function.
    pub fn call(&self, value: Value) -> Value {
        self.func.transform(value)
    }

    /// Whether both handles point at the same function.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func) as *const (),
            Arc::as_ptr(&other.func) as *const (),
        )
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Callable({})", name),
            None => write!(f, "Callable(<anonymous>)"),
        }
    }
}

/// A named handle to a Rust type, the container's notion of a class-like value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: Arc<str>,
    type_id: TypeId,
}

impl TypeRef {
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            type_id: TypeId::of::<T>(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl Value {
    pub fn sym(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Build a map value from key/value pairs, keeping their order.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Key>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn callable<F>(func: F) -> Self
    where
        F: TransformFn + 'static,
    {
        Value::Opaque(Opaque::Callable(Callable::new(func)))
    }

    /// True for every value that is not a map, a list or an opaque value.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_) | Value::Opaque(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text or symbol contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Value::Opaque(o) => Some(o),
            _ => None,
        }
    }

    /// Short description of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Opaque(Opaque::Callable(_)) => "callable",
            Value::Opaque(Opaque::Type(_)) => "type",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Text(s) => write!(f, "{}", s),
            Value::Symbol(s) => write!(f, ":{}", s),
            Value::List(l) => write!(f, "{:?}", l),
            Value::Map(m) => write!(f, "{:?}", m),
            Value::Opaque(o) => write!(f, "{}", o.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<Key, Value>> for Value {
    fn from(map: IndexMap<Key, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Opaque(Opaque::Callable(c))
    }
}

impl From<TypeRef> for Value {
    fn from(t: TypeRef) -> Self {
        Value::Opaque(Opaque::Type(t))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    // u64 beyond i64::MAX and real numbers
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(arr) => {
                Value::List(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (Key::Text(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = ConfigError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => Value::Text(s),
            serde_yaml::Value::Sequence(seq) => Value::List(
                seq.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (k, v) in mapping {
                    map.insert(yaml_key(k)?, Value::try_from(v)?);
                }
                Value::Map(map)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<Key, ConfigError> {
    match key {
        serde_yaml::Value::String(s) => Ok(Key::Text(s)),
        serde_yaml::Value::Bool(b) => Ok(Key::Bool(b)),
        serde_yaml::Value::Null => Ok(Key::Null),
        serde_yaml::Value::Number(n) => n.as_i64().map(Key::Int).ok_or_else(|| {
            ConfigError::Conversion(format!("unsupported numeric key {}", n))
        }),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(ConfigError::Conversion(format!(
            "unsupported mapping key {:?}",
            other
        ))),
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) | Value::Symbol(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let names = serialized_names(entries.keys()).map_err(S::Error::custom)?;
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (name, v) in names.iter().zip(entries.values()) {
                    map.serialize_entry(name, v)?;
                }
                map.end()
            }
            Value::Opaque(o) => serializer.serialize_str(&o.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Widget;

    #[test]
    fn test_from_json_keeps_order_and_types() {
        let value = Value::from(json!({"b": 1, "a": [true, 2.5, null], "c": "x"}));
        let Value::Map(map) = value else {
            panic!("expected a map");
        };
        let keys: Vec<&Key> = map.keys().collect();
        assert_eq!(keys, vec![&Key::from("b"), &Key::from("a"), &Key::from("c")]);
        assert_eq!(map[&Key::from("b")], Value::Int(1));
        assert_eq!(
            map[&Key::from("a")],
            Value::list([Value::Bool(true), Value::Float(2.5), Value::Null])
        );
    }

    #[test]
    fn test_from_yaml_non_text_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\n~: nothing\n").unwrap();
        let Value::Map(map) = Value::try_from(yaml).unwrap() else {
            panic!("expected a map");
        };
        assert_eq!(map[&Key::Int(1)], Value::from("one"));
        assert_eq!(map[&Key::Bool(true)], Value::from("yes"));
        assert_eq!(map[&Key::Null], Value::from("nothing"));
    }

    #[test]
    fn test_from_yaml_rejects_float_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1.5: x\n").unwrap();
        assert!(matches!(
            Value::try_from(yaml),
            Err(ConfigError::Conversion(_))
        ));
    }

    #[test]
    fn test_callable_identity() {
        let double = Callable::new(|v: Value| match v {
            Value::Int(i) => Value::Int(i * 2),
            other => other,
        });
        let shared = double.clone();
        let other = Callable::new(|v: Value| v);

        assert!(double.ptr_eq(&shared));
        assert!(!double.ptr_eq(&other));
        assert_eq!(shared.call(Value::Int(4)), Value::Int(8));
    }

    #[test]
    fn test_type_ref() {
        let t = TypeRef::of::<Widget>("Widget");
        assert!(t.is::<Widget>());
        assert!(!t.is::<String>());
        assert_eq!(Value::from(t.clone()).kind(), "type");
        assert!(!Value::from(t).is_scalar());
    }

    #[test]
    fn test_serialize_to_json() {
        let value = Value::map([
            (Key::sym("name"), Value::sym("svc")),
            (Key::Int(1), Value::list([1, 2])),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({"name": "svc", "1": [1, 2]}));
    }
}
