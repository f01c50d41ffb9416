//! Stored nodes of a configuration tree.
//!
//! Every entry of a [`ConfigMap`] or [`ConfigSeq`] is a [`Slot`]: the stored
//! [`Node`] plus a write-once cache that holds the processed value of a
//! scalar leaf when the tree was built with lazy loading.

use std::sync::{Arc, OnceLock};

use serde::{Serialize, Serializer};

use crate::config_map::ConfigMap;
use crate::config_seq::ConfigSeq;
use crate::error::{ConfigError, Result};
use crate::key::Key;
use crate::options::Options;
use crate::value::{Callable, Opaque, Value};

/// Policy shared by every container of one tree.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) freeze: bool,
    pub(crate) lazy_loading: bool,
    pub(crate) raise_on_missing: bool,
    pub(crate) processors: Vec<Callable>,
}

impl Settings {
    pub(crate) fn from_options(options: &Options) -> Self {
        Self {
            freeze: options.is_freeze(),
            lazy_loading: options.is_lazy_loading(),
            raise_on_missing: options.is_raise_on_missing(),
            processors: options.effective_processors(),
        }
    }

    /// Run `value` through the processor chain, left to right.
    pub(crate) fn process(&self, value: Value) -> Value {
        self.processors
            .iter()
            .fold(value, |acc, processor| processor.call(acc))
    }

    fn processes_eagerly(&self) -> bool {
        !self.lazy_loading && !self.processors.is_empty()
    }

    fn processes_lazily(&self) -> bool {
        self.lazy_loading && !self.processors.is_empty()
    }

    /// State a container takes once construction is over.
    pub(crate) fn sealed_state(&self) -> Lifecycle {
        if self.freeze {
            Lifecycle::Frozen
        } else {
            Lifecycle::Mutable
        }
    }
}

/// Lifecycle of a single container.
///
/// Containers are `Building` only while their tree is being constructed;
/// the choice between `Mutable` and `Frozen` is made once and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Building,
    Mutable,
    Frozen,
}

/// A stored value.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Map(ConfigMap),
    Seq(ConfigSeq),
    Opaque(Opaque),
    Scalar(Value),
}

impl Node {
    /// Build the stored form of `value`. Nested containers come back in
    /// the `Building` state; callers seal the finished subtree.
    pub(crate) fn construct(value: Value, settings: &Arc<Settings>) -> Node {
        match value {
            Value::Map(entries) => Node::Map(ConfigMap::construct(entries, settings)),
            Value::List(items) => Node::Seq(ConfigSeq::construct(items, settings)),
            Value::Opaque(opaque) => Node::Opaque(opaque),
            scalar if settings.processes_eagerly() => Node::Scalar(settings.process(scalar)),
            scalar => Node::Scalar(scalar),
        }
    }

    pub(crate) fn seal(&mut self) {
        match self {
            Node::Map(map) => map.seal(),
            Node::Seq(seq) => seq.seal(),
            Node::Opaque(_) | Node::Scalar(_) => {}
        }
    }

    /// Deep copy with every lazy cache emptied.
    pub(crate) fn fresh(&self) -> Node {
        match self {
            Node::Map(map) => Node::Map(map.fresh()),
            Node::Seq(seq) => Node::Seq(seq.fresh()),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    node: Node,
    cache: OnceLock<Value>,
}

impl Slot {
    pub(crate) fn new(node: Node) -> Self {
        Self {
            node,
            cache: OnceLock::new(),
        }
    }

    /// Read access. Only scalar leaves are processed; in lazy mode the
    /// result is computed on first read and cached. Leaves carry `state`,
    /// the lifecycle of the container that owns the slot.
    pub(crate) fn resolve<'a>(&'a self, settings: &Settings, state: Lifecycle) -> NodeRef<'a> {
        match &self.node {
            Node::Map(map) => NodeRef::Map(map),
            Node::Seq(seq) => NodeRef::Seq(seq),
            Node::Opaque(opaque) => NodeRef::Opaque(opaque, state),
            Node::Scalar(raw) if settings.processes_lazily() => NodeRef::Scalar(
                self.cache.get_or_init(|| {
                    tracing::trace!(value = %raw, "processing lazily loaded value");
                    settings.process(raw.clone())
                }),
                state,
            ),
            Node::Scalar(value) => NodeRef::Scalar(value, state),
        }
    }

    pub(crate) fn is_processed(&self) -> bool {
        self.cache.get().is_some()
    }

    /// In-place access. Any cached processed value is dropped because the
    /// stored value may change underneath it.
    pub(crate) fn node_mut(&mut self) -> NodeMut<'_> {
        self.cache = OnceLock::new();
        match &mut self.node {
            Node::Map(map) => NodeMut::Map(map),
            Node::Seq(seq) => NodeMut::Seq(seq),
            Node::Opaque(opaque) => NodeMut::Opaque(opaque),
            Node::Scalar(value) => NodeMut::Scalar(value),
        }
    }

    pub(crate) fn seal(&mut self) {
        self.node.seal();
    }

    pub(crate) fn fresh(&self) -> Slot {
        Slot::new(self.node.fresh())
    }

    /// Consume the slot, yielding what a read would have returned.
    pub(crate) fn into_value(self, settings: &Settings) -> Value {
        match self.node {
            Node::Map(map) => map.to_value(),
            Node::Seq(seq) => seq.to_value(),
            Node::Opaque(opaque) => Value::Opaque(opaque),
            Node::Scalar(raw) if settings.processes_lazily() => self
                .cache
                .into_inner()
                .unwrap_or_else(|| settings.process(raw)),
            Node::Scalar(value) => value,
        }
    }
}

/// Borrowed view of a stored value, as returned by reads.
///
/// Leaves carry the lifecycle of the container they were read from.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Map(&'a ConfigMap),
    Seq(&'a ConfigSeq),
    Opaque(&'a Opaque, Lifecycle),
    Scalar(&'a Value, Lifecycle),
}

impl<'a> NodeRef<'a> {
    pub fn as_map(&self) -> Option<&'a ConfigMap> {
        match *self {
            NodeRef::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&'a ConfigSeq> {
        match *self {
            NodeRef::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&'a Opaque> {
        match *self {
            NodeRef::Opaque(opaque, _) => Some(opaque),
            // a processor may have resolved a scalar into an opaque value
            NodeRef::Scalar(Value::Opaque(opaque), _) => Some(opaque),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&'a Value> {
        match *self {
            NodeRef::Scalar(value, _) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NodeRef::Map(_) => "map",
            NodeRef::Seq(_) => "sequence",
            NodeRef::Opaque(Opaque::Callable(_), _) => "callable",
            NodeRef::Opaque(Opaque::Type(_), _) => "type",
            NodeRef::Scalar(value, _) => value.kind(),
        }
    }

    /// Whether the node refuses mutation. A leaf is frozen when the
    /// container holding it is.
    pub fn is_frozen(&self) -> bool {
        match *self {
            NodeRef::Map(map) => map.is_frozen(),
            NodeRef::Seq(seq) => seq.is_frozen(),
            NodeRef::Opaque(_, state) | NodeRef::Scalar(_, state) => state == Lifecycle::Frozen,
        }
    }

    /// Export the processed value.
    pub fn to_value(&self) -> Value {
        match self {
            NodeRef::Map(map) => map.to_value(),
            NodeRef::Seq(seq) => seq.to_value(),
            NodeRef::Opaque(opaque, _) => Value::Opaque((*opaque).clone()),
            NodeRef::Scalar(value, _) => (*value).clone(),
        }
    }

    /// Read a key of a nested map. Fails on non-map nodes.
    pub fn get(&self, key: impl Into<Key>) -> Result<Option<NodeRef<'a>>> {
        match *self {
            NodeRef::Map(map) => map.get(key),
            other => Err(ConfigError::InvalidArgument(format!(
                "cannot look up {} in a {}",
                key.into().normalize(),
                other.kind()
            ))),
        }
    }
}

impl PartialEq<Value> for NodeRef<'_> {
    fn eq(&self, other: &Value) -> bool {
        match self {
            NodeRef::Scalar(value, _) => *value == other,
            _ => self.to_value() == *other,
        }
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            NodeRef::Map(map) => map.serialize(serializer),
            NodeRef::Seq(seq) => seq.serialize(serializer),
            NodeRef::Opaque(opaque, _) => serializer.serialize_str(&opaque.name()),
            NodeRef::Scalar(value, _) => value.serialize(serializer),
        }
    }
}

/// Mutable view handed out by `get_mut` on an unfrozen container.
///
/// Scalars written through this view are stored as given; they are not run
/// through the processor chain again (use `set` for that).
#[derive(Debug)]
pub enum NodeMut<'a> {
    Map(&'a mut ConfigMap),
    Seq(&'a mut ConfigSeq),
    Opaque(&'a mut Opaque),
    Scalar(&'a mut Value),
}

impl<'a> NodeMut<'a> {
    pub fn into_map(self) -> Option<&'a mut ConfigMap> {
        match self {
            NodeMut::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_seq(self) -> Option<&'a mut ConfigSeq> {
        match self {
            NodeMut::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn into_scalar(self) -> Option<&'a mut Value> {
        match self {
            NodeMut::Scalar(value) => Some(value),
            _ => None,
        }
    }
}
