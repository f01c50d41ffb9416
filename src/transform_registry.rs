//! Transform registry for named value transformations.
//!
//! Processors are plain one-argument functions over [`Value`]. This module
//! provides the trait they implement and a registry that maps option names
//! to the built-in transforms a container can enable by flag.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::builtins;
use crate::value::{Callable, Value};

/// Names of the built-in transforms, in the order they join a processor chain.
pub const BUILTIN_NAMES: &[&str] = &["constantize"];

/// Trait for transformation functions
///
/// A transform maps one value to another. Transforms that don't apply to a
/// given input return it unchanged.
pub trait TransformFn: Send + Sync {
    /// Execute the transformation
    fn transform(&self, value: Value) -> Value;
}

/// Simple function-based implementation of TransformFn
impl<F> TransformFn for F
where
    F: Fn(Value) -> Value + Send + Sync,
{
    fn transform(&self, value: Value) -> Value {
        self(value)
    }
}

/// Registry for storing named transformation functions
///
/// Iteration order is registration order.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    transforms: IndexMap<String, Callable>,
}

impl TransformRegistry {
    /// Create a new empty transform registry
    pub fn new() -> Self {
        Self {
            transforms: IndexMap::new(),
        }
    }

    /// Registry holding the built-in catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("constantize", builtins::constantize);
        registry
    }

    /// Register a transformation function
    ///
    /// # Example
    ///
    /// ```
    /// use configmap::{TransformRegistry, Value};
    ///
    /// let mut registry = TransformRegistry::new();
    /// registry.register("upcase", |v: Value| match v {
    ///     Value::Text(s) => Value::Text(s.to_uppercase()),
    ///     other => other,
    /// });
    /// assert_eq!(registry.call("upcase", Value::from("hi")), Value::from("HI"));
    /// ```
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: TransformFn + 'static,
    {
        let name = name.into();
        let callable = Callable::named(name.clone(), func);
        self.transforms.insert(name, callable);
    }

    /// Look up a transform by name
    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.transforms.get(name)
    }

    /// Apply the named transform, or return `value` unchanged if there is none
    pub fn call(&self, name: &str, value: Value) -> Value {
        match self.transforms.get(name) {
            Some(transform) => transform.call(value),
            None => value,
        }
    }

    /// Check if a transform is registered
    pub fn has_transform(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

fn builtin_registry() -> &'static TransformRegistry {
    static REGISTRY: OnceLock<TransformRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TransformRegistry::builtin)
}

/// Resolve a built-in transform by option name.
pub fn lookup_builtin(name: &str) -> Option<Callable> {
    builtin_registry().get(name).cloned()
}

/// Apply the named built-in to `value`, or return it unchanged when `name`
/// is not a built-in.
pub fn transform(name: &str, value: Value) -> Value {
    builtin_registry().call(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_call_transform() {
        let mut registry = TransformRegistry::new();
        registry.register("negate", |v: Value| match v {
            Value::Int(i) => Value::Int(-i),
            other => other,
        });

        assert!(registry.has_transform("negate"));
        assert_eq!(registry.call("negate", Value::Int(3)), Value::Int(-3));
        assert_eq!(registry.get("negate").unwrap().name(), Some("negate"));
    }

    #[test]
    fn test_unknown_transform_is_identity() {
        let registry = TransformRegistry::new();
        assert_eq!(registry.call("nope", Value::from("x")), Value::from("x"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_keep_registration_order() {
        let mut registry = TransformRegistry::new();
        registry.register("b", |v: Value| v);
        registry.register("a", |v: Value| v);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_builtin_catalog_matches_names() {
        let registry = TransformRegistry::builtin();
        assert_eq!(registry.names().collect::<Vec<_>>(), BUILTIN_NAMES);
    }

    #[test]
    fn test_lookup_builtin() {
        let first = lookup_builtin("constantize").unwrap();
        let second = lookup_builtin("constantize").unwrap();
        assert_eq!(first.name(), Some("constantize"));
        assert!(first.ptr_eq(&second));
        assert!(lookup_builtin("not_a_builtin").is_none());
    }

    #[test]
    fn test_transform_by_name_passthrough() {
        assert_eq!(transform("not_a_builtin", Value::Int(1)), Value::Int(1));
        assert_eq!(
            transform("constantize", Value::from("plain")),
            Value::from("plain")
        );
    }
}
