//! Ordered sequences inside a configuration tree.
//!
//! Elements follow the same construction rule as map values and are read
//! through the same selective, optionally lazy path.

use std::sync::Arc;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};
use crate::node::{Lifecycle, Node, NodeMut, NodeRef, Settings, Slot};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct ConfigSeq {
    items: Vec<Slot>,
    settings: Arc<Settings>,
    state: Lifecycle,
}

impl ConfigSeq {
    pub(crate) fn construct(items: Vec<Value>, settings: &Arc<Settings>) -> Self {
        ConfigSeq {
            items: items
                .into_iter()
                .map(|item| Slot::new(Node::construct(item, settings)))
                .collect(),
            settings: Arc::clone(settings),
            state: Lifecycle::Building,
        }
    }

    pub(crate) fn seal(&mut self) {
        self.state = self.settings.sealed_state();
        for slot in &mut self.items {
            slot.seal();
        }
    }

    pub(crate) fn fresh(&self) -> Self {
        ConfigSeq {
            items: self.items.iter().map(Slot::fresh).collect(),
            settings: Arc::clone(&self.settings),
            state: self.state,
        }
    }

    pub fn get(&self, index: usize) -> Option<NodeRef<'_>> {
        self.items
            .get(index)
            .map(|slot| slot.resolve(&self.settings, self.state))
    }

    /// Like [`get`](Self::get), with negative indices counting from the end.
    pub fn get_signed(&self, index: i64) -> Option<NodeRef<'_>> {
        let index = if index < 0 {
            let back = usize::try_from(index.unsigned_abs()).ok()?;
            self.items.len().checked_sub(back)?
        } else {
            usize::try_from(index).ok()?
        };
        self.get(index)
    }

    pub fn first(&self) -> Option<NodeRef<'_>> {
        self.get(0)
    }

    pub fn last(&self) -> Option<NodeRef<'_>> {
        self.items.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == Lifecycle::Frozen
    }

    pub fn processed_count(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_processed()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + ExactSizeIterator + '_ {
        let (settings, state): (&Settings, Lifecycle) = (&self.settings, self.state);
        self.items.iter().map(move |slot| slot.resolve(settings, state))
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.is_frozen() {
            Err(ConfigError::FrozenMutation {
                target: "ConfigSeq".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn ensure_in_bounds(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(ConfigError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
        }
    }

    fn build(&self, value: Value) -> Slot {
        let mut node = Node::construct(value, &self.settings);
        node.seal();
        Slot::new(node)
    }

    pub fn push(&mut self, value: impl Into<Value>) -> Result<()> {
        self.ensure_mutable()?;
        let slot = self.build(value.into());
        self.items.push(slot);
        Ok(())
    }

    /// Replace the element at `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.ensure_mutable()?;
        self.ensure_in_bounds(index)?;
        let slot = self.build(value.into());
        self.items[index] = slot;
        Ok(())
    }

    /// Remove the element at `index`, returning what a read would have produced.
    pub fn remove(&mut self, index: usize) -> Result<Value> {
        self.ensure_mutable()?;
        self.ensure_in_bounds(index)?;
        let slot = self.items.remove(index);
        Ok(slot.into_value(&self.settings))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<Option<NodeMut<'_>>> {
        self.ensure_mutable()?;
        Ok(self.items.get_mut(index).map(Slot::node_mut))
    }

    pub fn to_value(&self) -> Value {
        Value::List(self.iter().map(|item| item.to_value()).collect())
    }
}

impl Serialize for ConfigSeq {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for item in self.iter() {
            seq.serialize_element(&item)?;
        }
        seq.end()
    }
}
