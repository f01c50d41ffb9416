//! Error type for configuration container operations.

use std::fmt;

use crate::key::Key;

/// Errors raised by [`ConfigMap`](crate::ConfigMap) and its sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Construction input or options were not of the expected shape.
    InvalidArgument(String),
    /// Read of an absent key while `raise_on_missing` is set.
    KeyNotFound {
        key: Key,
        available: Vec<Key>,
    },
    /// `set`/`delete` (or in-place access) against a frozen container.
    FrozenMutation {
        target: String,
    },
    /// Attribute-style access that no accessor answers to.
    NoSuchAttribute {
        name: String,
    },
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },
    /// A parsed document could not be represented as a [`Value`](crate::Value).
    Conversion(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            ConfigError::KeyNotFound { key, available } => {
                let keys: Vec<String> = available.iter().map(|k| k.to_string()).collect();
                write!(f, "Missing key {} in [{}]", key, keys.join(", "))
            }
            ConfigError::FrozenMutation { target } => {
                write!(f, "Can't modify frozen {}", target)
            }
            ConfigError::NoSuchAttribute { name } => {
                write!(f, "Undefined attribute '{}' on frozen config", name)
            }
            ConfigError::IndexOutOfBounds { index, len } => {
                write!(f, "Index {} out of bounds for sequence of length {}", index, len)
            }
            ConfigError::Conversion(msg) => write!(f, "Conversion error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_lists_available_keys() {
        let err = ConfigError::KeyNotFound {
            key: Key::sym("missing"),
            available: vec![Key::sym("k"), Key::Int(1)],
        };
        assert_eq!(err.to_string(), "Missing key :missing in [:k, 1]");
    }

    #[test]
    fn test_frozen_mutation_display() {
        let err = ConfigError::FrozenMutation {
            target: "ConfigMap".to_string(),
        };
        assert_eq!(err.to_string(), "Can't modify frozen ConfigMap");
    }
}
