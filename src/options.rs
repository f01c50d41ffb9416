//! Construction options for a configuration container.
//!
//! Options can be assembled three ways:
//!
//! * the typed builder on [`Options`]
//! * [`OptionFlags`], the boolean subset, deserialized with serde from an
//!   already-parsed document
//! * a dynamic [`Value`] map, validated by `Options::try_from`
//!
//! # Example
//!
//! ```
//! use configmap::{Options, Value};
//!
//! let options = Options::new()
//!     .freeze(false)
//!     .lazy_loading(true)
//!     .processor(|v: Value| v);
//! assert_eq!(options.processors().len(), 1);
//! ```

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, Result};
use crate::transform_registry::{lookup_builtin, TransformFn, BUILTIN_NAMES};
use crate::value::{Callable, Opaque, Value};

/// Options accepted by [`ConfigMap::new`](crate::ConfigMap::new).
#[derive(Debug, Clone)]
pub struct Options {
    freeze: bool,
    lazy_loading: bool,
    raise_on_missing: bool,
    processors: Vec<Callable>,
    builtins: IndexMap<String, bool>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            freeze: true,
            lazy_loading: false,
            raise_on_missing: true,
            processors: Vec::new(),
            builtins: IndexMap::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the whole tree immutable once built. Defaults to `true`.
    pub fn freeze(mut self, freeze: bool) -> Self {
        self.freeze = freeze;
        self
    }

    /// Defer processing of scalar leaves until first read. Defaults to `false`.
    pub fn lazy_loading(mut self, lazy: bool) -> Self {
        self.lazy_loading = lazy;
        self
    }

    /// Whether reading an absent key is an error. Defaults to `true`.
    pub fn raise_on_missing(mut self, raise: bool) -> Self {
        self.raise_on_missing = raise;
        self
    }

    /// Append a processor to the explicit chain.
    pub fn processor<F>(mut self, func: F) -> Self
    where
        F: TransformFn + 'static,
    {
        self.processors.push(Callable::new(func));
        self
    }

    /// Append an existing callable to the explicit chain.
    pub fn processor_callable(mut self, callable: Callable) -> Self {
        self.processors.push(callable);
        self
    }

    /// Toggle a built-in transform by name.
    pub fn builtin(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.builtins.insert(name.into(), enabled);
        self
    }

    pub fn constantize(self, enabled: bool) -> Self {
        self.builtin("constantize", enabled)
    }

    /// Build options from deserialized flags. The processor chain starts empty.
    pub fn from_flags(flags: OptionFlags) -> Self {
        Self {
            freeze: flags.freeze,
            lazy_loading: flags.lazy_loading,
            raise_on_missing: flags.raise_on_missing,
            processors: Vec::new(),
            builtins: flags.builtins,
        }
    }

    pub fn is_freeze(&self) -> bool {
        self.freeze
    }

    pub fn is_lazy_loading(&self) -> bool {
        self.lazy_loading
    }

    pub fn is_raise_on_missing(&self) -> bool {
        self.raise_on_missing
    }

    /// The explicitly supplied processors.
    pub fn processors(&self) -> &[Callable] {
        &self.processors
    }

    /// The full chain: explicit processors first, then every enabled
    /// built-in in registry order.
    pub fn effective_processors(&self) -> Vec<Callable> {
        for (name, enabled) in &self.builtins {
            if *enabled && !BUILTIN_NAMES.contains(&name.as_str()) {
                tracing::debug!(option = %name, "ignoring unknown builtin transform");
            }
        }

        let mut chain = self.processors.clone();
        chain.extend(
            BUILTIN_NAMES
                .iter()
                .filter(|name| self.builtins.get(**name).copied().unwrap_or(false))
                .filter_map(|name| lookup_builtin(name)),
        );
        chain
    }
}

/// The boolean options, loadable with serde.
///
/// Built-in transform flags (e.g. `constantize: true`) are collected from the
/// remaining keys. Any other key, `processors` included, is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionFlags {
    pub freeze: bool,
    pub lazy_loading: bool,
    pub raise_on_missing: bool,
    #[serde(flatten, deserialize_with = "builtin_flags")]
    pub builtins: IndexMap<String, bool>,
}

fn builtin_flags<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let rest = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
    let mut flags = IndexMap::new();
    for (name, value) in rest {
        if !BUILTIN_NAMES.contains(&name.as_str()) {
            tracing::debug!(option = %name, "ignoring unrecognized option");
            continue;
        }
        match value {
            serde_json::Value::Bool(enabled) => {
                flags.insert(name, enabled);
            }
            other => {
                return Err(D::Error::custom(format!(
                    "option '{}' must be a bool, got {}",
                    name, other
                )))
            }
        }
    }
    Ok(flags)
}

impl Default for OptionFlags {
    fn default() -> Self {
        Self {
            freeze: true,
            lazy_loading: false,
            raise_on_missing: true,
            builtins: IndexMap::new(),
        }
    }
}

impl From<OptionFlags> for Options {
    fn from(flags: OptionFlags) -> Self {
        Options::from_flags(flags)
    }
}

impl TryFrom<&Value> for Options {
    type Error = ConfigError;

    /// Validate a dynamic options map.
    ///
    /// Unrecognized option names are ignored.
    fn try_from(value: &Value) -> Result<Self> {
        let Value::Map(entries) = value else {
            return Err(ConfigError::InvalidArgument(format!(
                "options must be a map, got {}",
                value.kind()
            )));
        };

        let mut options = Options::default();
        for (key, option) in entries {
            let key = key.clone().normalize();
            let Some(name) = key.as_str() else {
                tracing::debug!(option = %key, "ignoring non-text option key");
                continue;
            };
            match name {
                "freeze" => options.freeze = expect_bool(name, option)?,
                "lazy_loading" => options.lazy_loading = expect_bool(name, option)?,
                "raise_on_missing" => options.raise_on_missing = expect_bool(name, option)?,
                "processors" => options.processors = parse_processors(option)?,
                builtin if BUILTIN_NAMES.contains(&builtin) => {
                    let enabled = expect_bool(builtin, option)?;
                    options.builtins.insert(builtin.to_string(), enabled);
                }
                other => tracing::debug!(option = other, "ignoring unrecognized option"),
            }
        }
        Ok(options)
    }
}

impl TryFrom<Value> for Options {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        Options::try_from(&value)
    }
}

fn expect_bool(name: &str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        ConfigError::InvalidArgument(format!(
            "option '{}' must be a bool, got {}",
            name,
            value.kind()
        ))
    })
}

fn parse_processors(value: &Value) -> Result<Vec<Callable>> {
    let invalid = || ConfigError::InvalidArgument("processors must be a list of callables!".to_string());

    let Value::List(items) = value else {
        return Err(invalid());
    };
    items
        .iter()
        .map(|item| match item {
            Value::Opaque(Opaque::Callable(c)) => Ok(c.clone()),
            _ => Err(invalid()),
        })
        .collect()
}
