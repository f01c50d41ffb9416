//! # configmap: Recursive Configuration Containers
//!
//! configmap wraps an already-parsed nested mapping (maps of maps, lists and
//! scalars) in a tree of read-oriented containers.
//!
//! ## Features
//!
//! - **Key normalization**: text keys are stored as symbols, so `"port"` and
//!   `Key::sym("port")` address the same entry; other keys are kept as-is
//! - **Processor chain**: one-argument transforms applied left to right to
//!   every scalar leaf, with built-ins selectable by flag (`constantize`)
//! - **Deep freeze**: by default every level of the tree refuses mutation
//! - **Lazy loading**: optionally defer processing to first read, caching
//!   the result per key
//! - **Attribute access**: `attr("name")` / `set_attr("name", v)` alongside
//!   `get` / `set` / `delete`
//!
//! ## Example
//!
//! ```
//! use configmap::{ConfigMap, ConfigError, Options, Value};
//! use serde_json::json;
//!
//! let options = Options::new()
//!     .freeze(false)
//!     .lazy_loading(true)
//!     .processor(|v: Value| match v {
//!         Value::Text(s) => Value::Text(s.trim().to_string()),
//!         other => other,
//!     });
//!
//! let mut config = ConfigMap::from_json(json!({"db": {"host": " localhost "}}), options)?;
//! assert_eq!(config.dig_path("db.host")?.unwrap().as_str(), Some("localhost"));
//!
//! config.set_attr("debug", true)?;
//! assert_eq!(config.attr("debug")?.unwrap().as_bool(), Some(true));
//!
//! config.delete("debug")?;
//! assert!(matches!(config.get("debug"), Err(ConfigError::KeyNotFound { .. })));
//! # Ok::<(), ConfigError>(())
//! ```

// Core modules
pub mod error;
pub mod key;
pub mod value;
pub mod path;

// Transformations
pub mod transform_registry;
pub mod builtins;

// Container
pub mod options;
pub mod node;
pub mod config_map;
pub mod config_seq;

// Re-export key types
pub use error::{ConfigError, Result};
pub use key::Key;
pub use value::{Callable, Opaque, TypeRef, Value};
pub use path::{FieldPath, PathSegment};

pub use transform_registry::{
    lookup_builtin, transform, TransformFn, TransformRegistry, BUILTIN_NAMES,
};
pub use builtins::{constant, constantize, define_constant, undefine_constant};

pub use options::{OptionFlags, Options};
pub use node::{Lifecycle, NodeMut, NodeRef};
pub use config_map::{ConfigMap, Iter};
pub use config_seq::ConfigSeq;
