//! The configuration container.
//!
//! A [`ConfigMap`] is built once from a raw nested [`Value::Map`]. Text keys
//! are normalized to symbols, nested maps and lists become child containers
//! sharing the parent's settings, and scalar leaves go through the processor
//! chain, either at construction or on first read when lazy loading is on.
//! Unless built with `freeze(false)`, the whole tree refuses mutation.
//!
//! # Example
//!
//! ```
//! use configmap::{ConfigMap, Options, Value};
//! use serde_json::json;
//!
//! let config = ConfigMap::from_json(
//!     json!({"server": {"port": 8000}}),
//!     Options::new().processor(|v: Value| match v {
//!         Value::Int(i) => Value::Int(i + 80),
//!         other => other,
//!     }),
//! )?;
//!
//! assert_eq!(config.dig_path("server.port")?.unwrap().as_i64(), Some(8080));
//! assert!(config.is_frozen());
//! # Ok::<(), configmap::ConfigError>(())
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};
use crate::key::{is_accessor_name, serialized_names, Key};
use crate::node::{Lifecycle, Node, NodeMut, NodeRef, Settings, Slot};
use crate::options::Options;
use crate::path::FieldPath;
use crate::value::{Callable, Value};

/// An ordered, normalized-key configuration container.
#[derive(Debug, Clone)]
pub struct ConfigMap {
    entries: IndexMap<Key, Slot>,
    settings: Arc<Settings>,
    state: Lifecycle,
}

impl ConfigMap {
    /// Build a container from a raw map.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `raw` is not a [`Value::Map`].
    pub fn new(raw: impl Into<Value>, options: Options) -> Result<Self> {
        let raw = raw.into();
        let kind = raw.kind();
        let Value::Map(entries) = raw else {
            return Err(ConfigError::InvalidArgument(format!(
                "first argument must be a map, got {}",
                kind
            )));
        };

        let settings = Arc::new(Settings::from_options(&options));
        let mut map = ConfigMap::construct(entries, &settings);
        map.seal();

        tracing::debug!(
            keys = map.len(),
            lazy = settings.lazy_loading,
            frozen = map.is_frozen(),
            processors = settings.processors.len(),
            "constructed config map"
        );
        Ok(map)
    }

    /// Build a container with options given as a dynamic map, e.g.
    /// `{freeze: false, processors: [...]}`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `raw` is not a map or the options are malformed.
    pub fn with_option_map(raw: impl Into<Value>, options: &Value) -> Result<Self> {
        let options = Options::try_from(options)?;
        Self::new(raw, options)
    }

    /// Build a container from an in-memory JSON document.
    pub fn from_json(json: serde_json::Value, options: Options) -> Result<Self> {
        Self::new(Value::from(json), options)
    }

    /// Build a container from an in-memory YAML document.
    pub fn from_yaml(yaml: serde_yaml::Value, options: Options) -> Result<Self> {
        Self::new(Value::try_from(yaml)?, options)
    }

    /// An empty container; useful with `freeze(false)`.
    pub fn empty(options: Options) -> Self {
        let settings = Arc::new(Settings::from_options(&options));
        let mut map = ConfigMap::construct(IndexMap::new(), &settings);
        map.seal();
        map
    }

    pub(crate) fn construct(entries: IndexMap<Key, Value>, settings: &Arc<Settings>) -> Self {
        let mut map = ConfigMap {
            entries: IndexMap::with_capacity(entries.len()),
            settings: Arc::clone(settings),
            state: Lifecycle::Building,
        };
        for (key, value) in entries {
            // a later key that normalizes to an existing one overwrites it in place
            map.entries
                .insert(key.normalize(), Slot::new(Node::construct(value, settings)));
        }
        map
    }

    pub(crate) fn seal(&mut self) {
        self.state = self.settings.sealed_state();
        for slot in self.entries.values_mut() {
            slot.seal();
        }
    }

    pub(crate) fn fresh(&self) -> Self {
        ConfigMap {
            entries: self
                .entries
                .iter()
                .map(|(key, slot)| (key.clone(), slot.fresh()))
                .collect(),
            settings: Arc::clone(&self.settings),
            state: self.state,
        }
    }

    /// Read the value stored under `key`.
    ///
    /// Text keys are normalized first. Child maps, sequences and opaque
    /// values are returned as stored; scalars come back processed.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if the key is absent and `raise_on_missing` is set.
    /// Otherwise an absent key reads as `Ok(None)`.
    pub fn get(&self, key: impl Into<Key>) -> Result<Option<NodeRef<'_>>> {
        let key = key.into().normalize();
        match self.entries.get(&key) {
            Some(slot) => Ok(Some(slot.resolve(&self.settings, self.state))),
            None => self.missing(key),
        }
    }

    fn missing<T>(&self, key: Key) -> Result<Option<T>> {
        if self.settings.raise_on_missing {
            Err(ConfigError::KeyNotFound {
                key,
                available: self.entries.keys().cloned().collect(),
            })
        } else {
            Ok(None)
        }
    }

    /// Follow `path` through nested maps (by key) and sequences (by integer
    /// index, negative counting from the end).
    ///
    /// Every step is a regular read, so the missing-key policy applies at
    /// each level. An out-of-range sequence index reads as `None`.
    pub fn dig<K, I>(&self, path: I) -> Result<Option<NodeRef<'_>>>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        let mut keys = path.into_iter();
        let Some(first) = keys.next() else {
            return Err(ConfigError::InvalidArgument("empty path".to_string()));
        };
        let Some(mut current) = self.get(first)? else {
            return Ok(None);
        };

        for key in keys {
            let key = key.into().normalize();
            let next = match current {
                NodeRef::Map(map) => map.get(key)?,
                NodeRef::Seq(seq) => match key {
                    Key::Int(index) => seq.get_signed(index),
                    other => {
                        return Err(ConfigError::InvalidArgument(format!(
                            "cannot index a sequence with {}",
                            other
                        )))
                    }
                },
                other => {
                    return Err(ConfigError::InvalidArgument(format!(
                        "cannot dig into a {} with {}",
                        other.kind(),
                        key
                    )))
                }
            };
            match next {
                Some(node) => current = node,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// [`dig`](Self::dig) with a dotted path such as `"servers.[0].host"`.
    pub fn dig_path(&self, path: &str) -> Result<Option<NodeRef<'_>>> {
        self.dig(FieldPath::from_dotted(path).keys())
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.entries.contains_key(&key.into().normalize())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == Lifecycle::Frozen
    }

    pub fn is_lazy_loading(&self) -> bool {
        self.settings.lazy_loading
    }

    pub fn raises_on_missing(&self) -> bool {
        self.settings.raise_on_missing
    }

    /// The effective processor chain shared by the whole tree.
    pub fn processors(&self) -> &[Callable] {
        &self.settings.processors
    }

    /// Number of entries of this container whose lazily processed value has
    /// been computed and cached.
    pub fn processed_count(&self) -> usize {
        self.entries.values().filter(|slot| slot.is_processed()).count()
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.is_frozen() {
            Err(ConfigError::FrozenMutation {
                target: "ConfigMap".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Store `value` under `key`, building it as a fresh subtree with this
    /// container's settings. Replaces any previous value and its cache.
    ///
    /// # Errors
    ///
    /// `FrozenMutation` if the container is frozen.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        self.ensure_mutable()?;
        let key = key.into().normalize();

        let mut node = Node::construct(value.into(), &self.settings);
        node.seal();
        tracing::debug!(key = %key, "set config entry");
        self.entries.insert(key, Slot::new(node));
        Ok(())
    }

    /// Remove `key`, returning the value a read would have produced.
    ///
    /// # Errors
    ///
    /// `FrozenMutation` if the container is frozen.
    pub fn delete(&mut self, key: impl Into<Key>) -> Result<Option<Value>> {
        self.ensure_mutable()?;
        let key = key.into().normalize();

        let removed = self.entries.shift_remove(&key);
        if removed.is_some() {
            tracing::debug!(key = %key, "deleted config entry");
        }
        Ok(removed.map(|slot| slot.into_value(&self.settings)))
    }

    /// In-place access to the value under `key`.
    ///
    /// # Errors
    ///
    /// `FrozenMutation` if the container is frozen; otherwise the
    /// missing-key policy applies.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Result<Option<NodeMut<'_>>> {
        self.ensure_mutable()?;
        let key = key.into().normalize();

        if !self.entries.contains_key(&key) {
            return self.missing(key);
        }
        Ok(self.entries.get_mut(&key).map(Slot::node_mut))
    }

    /// Whether an attribute accessor named `name` exists.
    pub fn responds_to(&self, name: &str) -> bool {
        is_accessor_name(name) && self.entries.contains_key(&Key::sym(name))
    }

    /// Names of all attribute accessors, in key order.
    pub fn accessors(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .filter(|key| key.has_accessor())
            .filter_map(Key::as_str)
    }

    /// Attribute-style read.
    ///
    /// # Errors
    ///
    /// For a name with no accessor: `NoSuchAttribute` on a frozen
    /// container, else the missing-key policy.
    pub fn attr(&self, name: &str) -> Result<Option<NodeRef<'_>>> {
        if self.responds_to(name) {
            return self.get(Key::sym(name));
        }
        if self.is_frozen() {
            return Err(ConfigError::NoSuchAttribute {
                name: name.to_string(),
            });
        }
        self.missing(Key::sym(name))
    }

    /// Attribute-style write, equivalent to `set` with a symbolic key.
    ///
    /// # Errors
    ///
    /// `NoSuchAttribute` on a frozen container, `InvalidArgument` if `name`
    /// can't be an accessor name.
    pub fn set_attr(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.is_frozen() {
            return Err(ConfigError::NoSuchAttribute {
                name: format!("{}=", name),
            });
        }
        if !is_accessor_name(name) {
            return Err(ConfigError::InvalidArgument(format!(
                "'{}' is not a valid attribute name",
                name
            )));
        }
        self.set(Key::sym(name), value)
    }

    /// Entries in order, each value read the same way as [`get`](Self::get).
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
            settings: self.settings.as_ref(),
            state: self.state,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.iter().map(|(_, value)| value)
    }

    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&Key, NodeRef<'_>),
    {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    pub fn map<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&Key, NodeRef<'_>) -> T,
    {
        self.iter().map(|(key, value)| f(key, value)).collect()
    }

    /// A new container with the entries `predicate` accepts.
    ///
    /// The result shares this container's settings, is sealed on its own and
    /// starts with empty lazy caches.
    pub fn filter<F>(&self, mut predicate: F) -> ConfigMap
    where
        F: FnMut(&Key, NodeRef<'_>) -> bool,
    {
        let mut filtered = ConfigMap {
            entries: IndexMap::new(),
            settings: Arc::clone(&self.settings),
            state: Lifecycle::Building,
        };
        for (key, slot) in &self.entries {
            if predicate(key, slot.resolve(&self.settings, self.state)) {
                filtered.entries.insert(key.clone(), slot.fresh());
            }
        }
        filtered.seal();
        filtered
    }

    /// A new container without the entries `predicate` accepts.
    pub fn reject<F>(&self, mut predicate: F) -> ConfigMap
    where
        F: FnMut(&Key, NodeRef<'_>) -> bool,
    {
        self.filter(|key, value| !predicate(key, value))
    }

    pub fn any<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Key, NodeRef<'_>) -> bool,
    {
        self.iter().any(|(key, value)| predicate(key, value))
    }

    pub fn all<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Key, NodeRef<'_>) -> bool,
    {
        self.iter().all(|(key, value)| predicate(key, value))
    }

    pub fn none<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&Key, NodeRef<'_>) -> bool,
    {
        !self.any(predicate)
    }

    /// True when exactly one entry matches.
    pub fn one<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Key, NodeRef<'_>) -> bool,
    {
        self.iter()
            .filter(|(key, value)| predicate(*key, *value))
            .take(2)
            .count()
            == 1
    }

    /// Export the processed tree.
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }
}

/// Iterator over the entries of a [`ConfigMap`].
pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, Key, Slot>,
    settings: &'a Settings,
    state: Lifecycle,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Key, NodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (settings, state) = (self.settings, self.state);
        self.inner
            .next()
            .map(|(key, slot)| (key, slot.resolve(settings, state)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ConfigMap {
    type Item = (&'a Key, NodeRef<'a>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for ConfigMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names = serialized_names(self.keys()).map_err(S::Error::custom)?;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, (_, value)) in names.iter().zip(self.iter()) {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_five() -> Options {
        Options::new().processor(|v: Value| match v {
            Value::Int(i) => Value::Int(i + 5),
            other => other,
        })
    }

    #[test]
    fn test_rejects_non_map_input() {
        let err = ConfigMap::new(Value::list([1, 2]), Options::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArgument(_)));
    }

    #[test]
    fn test_text_and_symbol_keys_are_interchangeable() {
        let config = ConfigMap::from_json(json!({"k": 1}), Options::default()).unwrap();

        assert_eq!(config.get("k").unwrap().unwrap(), Value::Int(1));
        assert_eq!(config.get(Key::sym("k")).unwrap().unwrap(), Value::Int(1));
        assert_eq!(config.keys().collect::<Vec<_>>(), vec![&Key::sym("k")]);
    }

    #[test]
    fn test_duplicate_keys_after_normalization() {
        let raw = Value::map([
            (Key::from("k"), Value::Int(1)),
            (Key::from("other"), Value::Int(2)),
            (Key::sym("k"), Value::Int(3)),
        ]);
        let config = ConfigMap::new(raw, Options::default()).unwrap();

        assert_eq!(config.len(), 2);
        assert_eq!(config.get("k").unwrap().unwrap(), Value::Int(3));
        assert_eq!(config.keys().next(), Some(&Key::sym("k")));
    }

    #[test]
    fn test_missing_key_policy() {
        let raising = ConfigMap::from_json(json!({"a": 1}), Options::default()).unwrap();
        assert!(matches!(
            raising.get("b"),
            Err(ConfigError::KeyNotFound { .. })
        ));

        let lenient =
            ConfigMap::from_json(json!({"a": 1}), Options::new().raise_on_missing(false)).unwrap();
        assert!(lenient.get("b").unwrap().is_none());
    }

    #[test]
    fn test_eager_processing() {
        let config = ConfigMap::from_json(json!({"a": 1, "b": "x"}), add_five()).unwrap();
        assert_eq!(config.get("a").unwrap().unwrap(), Value::Int(6));
        assert_eq!(config.get("b").unwrap().unwrap(), Value::from("x"));
        assert_eq!(config.processed_count(), 0);
    }

    #[test]
    fn test_lazy_processing_cached_per_key() {
        let config =
            ConfigMap::from_json(json!({"a": 1, "b": 2}), add_five().lazy_loading(true)).unwrap();
        assert_eq!(config.processed_count(), 0);

        assert_eq!(config.get("a").unwrap().unwrap(), Value::Int(6));
        assert_eq!(config.processed_count(), 1);
        assert_eq!(config.get("a").unwrap().unwrap(), Value::Int(6));
        assert_eq!(config.processed_count(), 1);
    }

    #[test]
    fn test_set_replaces_stale_cache() {
        let mut config = ConfigMap::from_json(
            json!({"a": 1}),
            add_five().lazy_loading(true).freeze(false),
        )
        .unwrap();
        assert_eq!(config.get("a").unwrap().unwrap(), Value::Int(6));

        config.set("a", 10).unwrap();
        assert_eq!(config.processed_count(), 0);
        assert_eq!(config.get("a").unwrap().unwrap(), Value::Int(15));
    }

    #[test]
    fn test_set_builds_child_containers() {
        let mut config = ConfigMap::empty(Options::new().freeze(false));
        config
            .set("db", Value::map([("host", "localhost")]))
            .unwrap();

        let db = config.get("db").unwrap().unwrap().as_map().unwrap();
        assert!(!db.is_frozen());
        assert_eq!(db.get("host").unwrap().unwrap().as_str(), Some("localhost"));
    }

    #[test]
    fn test_frozen_rejects_mutation() {
        let mut config = ConfigMap::from_json(json!({"a": 1}), Options::default()).unwrap();

        assert!(matches!(
            config.set("b", 2),
            Err(ConfigError::FrozenMutation { .. })
        ));
        assert!(matches!(
            config.delete("a"),
            Err(ConfigError::FrozenMutation { .. })
        ));
        assert!(matches!(
            config.get_mut("a"),
            Err(ConfigError::FrozenMutation { .. })
        ));
        assert_eq!(config.get("a").unwrap().unwrap(), Value::Int(1));
    }

    #[test]
    fn test_delete_keeps_order_and_returns_value() {
        let mut config = ConfigMap::from_json(
            json!({"a": 1, "b": 2, "c": 3}),
            add_five().freeze(false),
        )
        .unwrap();

        assert_eq!(config.delete("b").unwrap(), Some(Value::Int(7)));
        assert_eq!(config.delete("b").unwrap(), None);
        assert_eq!(
            config.keys().collect::<Vec<_>>(),
            vec![&Key::sym("a"), &Key::sym("c")]
        );
    }

    #[test]
    fn test_get_mut_nested() {
        let mut config =
            ConfigMap::from_json(json!({"db": {"port": 1}}), Options::new().freeze(false)).unwrap();

        let db = config.get_mut("db").unwrap().unwrap().into_map().unwrap();
        db.set("port", 5432).unwrap();
        db.set("user", "app").unwrap();

        assert_eq!(config.dig_path("db.port").unwrap().unwrap(), Value::Int(5432));
        assert_eq!(config.dig(["db", "user"]).unwrap().unwrap().as_str(), Some("app"));
    }

    #[test]
    fn test_attr_access() {
        let config = ConfigMap::from_json(json!({"name": "svc", "1st": true}), Options::default())
            .unwrap();

        assert_eq!(config.attr("name").unwrap().unwrap().as_str(), Some("svc"));
        assert!(config.responds_to("name"));
        assert!(!config.responds_to("1st"));
        assert_eq!(config.accessors().collect::<Vec<_>>(), vec!["name"]);
        assert!(matches!(
            config.attr("missing"),
            Err(ConfigError::NoSuchAttribute { .. })
        ));
    }

    #[test]
    fn test_attr_unfrozen_follows_missing_policy() {
        let mut config = ConfigMap::empty(Options::new().freeze(false));
        assert!(matches!(
            config.attr("foo"),
            Err(ConfigError::KeyNotFound { .. })
        ));

        config.set_attr("foo", Value::sym("bar")).unwrap();
        assert_eq!(config.attr("foo").unwrap().unwrap(), Value::sym("bar"));
        assert_eq!(config.get("foo").unwrap().unwrap(), Value::sym("bar"));

        assert!(matches!(
            config.set_attr("9lives", 1),
            Err(ConfigError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_attr_on_frozen() {
        let mut config = ConfigMap::from_json(json!({"foo": 1}), Options::default()).unwrap();
        assert!(matches!(
            config.set_attr("foo", 2),
            Err(ConfigError::NoSuchAttribute { .. })
        ));
    }

    #[test]
    fn test_enumeration_predicates() {
        let config = ConfigMap::from_json(json!({"a": 1, "b": 2, "c": "x"}), add_five()).unwrap();

        assert!(config.any(|_, v| v.as_i64() == Some(7)));
        assert!(!config.all(|_, v| v.as_i64().is_some()));
        assert!(config.none(|_, v| v.as_i64() == Some(1)));
        assert!(config.one(|_, v| v.as_str().is_some()));
        assert!(!config.one(|_, v| v.as_i64().is_some()));

        let names = config.map(|k, _| k.to_name());
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_each_visits_processed_entries_in_order() {
        let config = ConfigMap::from_json(
            json!({"a": 1, "b": {"c": 2}, "d": 3}),
            add_five().lazy_loading(true),
        )
        .unwrap();

        let mut seen = Vec::new();
        config.each(|key, value| seen.push((key.clone(), value.to_value())));

        assert_eq!(
            seen,
            vec![
                (Key::sym("a"), Value::Int(6)),
                (Key::sym("b"), Value::map([(Key::sym("c"), Value::Int(7))])),
                (Key::sym("d"), Value::Int(8)),
            ]
        );
        assert_eq!(config.processed_count(), 2);
    }

    #[test]
    fn test_serialize_rejects_colliding_key_names() {
        let config = ConfigMap::new(
            Value::map([(Key::from("1"), Value::Int(1)), (Key::Int(1), Value::Int(2))]),
            Options::default(),
        )
        .unwrap();
        assert_eq!(config.len(), 2);

        let err = serde_json::to_string(&config).unwrap_err();
        assert!(err.to_string().contains("both serialize as"));
    }

    #[test]
    fn test_filter_and_reject() {
        let config = ConfigMap::from_json(json!({"a": 1, "b": 2, "c": 3}), add_five()).unwrap();

        let even = config.filter(|_, v| v.as_i64().map_or(false, |i| i % 2 == 0));
        assert_eq!(even.keys().collect::<Vec<_>>(), vec![&Key::sym("a"), &Key::sym("c")]);
        assert!(even.is_frozen());

        let rest = config.reject(|k, _| k == &Key::sym("a"));
        assert_eq!(rest.len(), 2);
        assert_eq!(rest.get("b").unwrap().unwrap(), Value::Int(7));
    }

    #[test]
    fn test_dig_errors_and_misses() {
        let config = ConfigMap::from_json(
            json!({"hosts": ["a", "b"], "port": 1}),
            Options::new().raise_on_missing(false),
        )
        .unwrap();

        assert_eq!(config.dig_path("hosts.[-1]").unwrap().unwrap().as_str(), Some("b"));
        assert!(config.dig_path("hosts.[5]").unwrap().is_none());
        assert!(config.dig_path("missing.x").unwrap().is_none());
        assert!(matches!(
            config.dig_path("port.x"),
            Err(ConfigError::InvalidArgument(_))
        ));
        assert!(matches!(
            config.dig_path("hosts.name"),
            Err(ConfigError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serialize_processed_tree() {
        let config = ConfigMap::from_json(
            json!({"a": 1, "nested": {"b": [2, {"c": 3}]}}),
            add_five().lazy_loading(true),
        )
        .unwrap();

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, json!({"a": 6, "nested": {"b": [7, {"c": 8}]}}));
    }

    #[test]
    fn test_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConfigMap>();
    }
}
