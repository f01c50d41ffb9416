//! Built-in transforms and the constant table they resolve against.
//!
//! `constantize` turns references such as `"::App::Widget"` into whatever
//! value was defined under that path with [`define_constant`]. Resolution is
//! best effort: unknown references come back unchanged.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::value::Value;

fn constants() -> &'static RwLock<HashMap<String, Value>> {
    static CONSTANTS: OnceLock<RwLock<HashMap<String, Value>>> = OnceLock::new();
    CONSTANTS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn canonical(path: &str) -> &str {
    path.trim_start_matches("::")
}

/// Make `value` resolvable under `path` (leading `::` is optional).
///
/// Returns the value previously defined under the same path, if any.
pub fn define_constant(path: &str, value: impl Into<Value>) -> Option<Value> {
    let mut table = constants().write().unwrap_or_else(|e| e.into_inner());
    table.insert(canonical(path).to_string(), value.into())
}

pub fn undefine_constant(path: &str) -> Option<Value> {
    let mut table = constants().write().unwrap_or_else(|e| e.into_inner());
    table.remove(canonical(path))
}

/// Look up a defined constant.
pub fn constant(path: &str) -> Option<Value> {
    let table = constants().read().unwrap_or_else(|e| e.into_inner());
    table.get(canonical(path)).cloned()
}

/// Resolve a constant reference.
///
/// * text starting with `::` resolves as that path
/// * a symbol whose name starts with `:` resolves as `:` + name
///
/// Anything else, and any reference with no matching constant, is returned
/// unchanged.
pub fn constantize(value: Value) -> Value {
    let path = match &value {
        Value::Symbol(name) if name.starts_with(':') => format!(":{}", name),
        Value::Text(text) if text.starts_with("::") => text.clone(),
        _ => return value,
    };
    constant(&path).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeRef;

    struct Widget;

    #[test]
    fn test_constantize_text_reference() {
        define_constant("BuiltinsTest::Widget", TypeRef::of::<Widget>("Widget"));

        let resolved = constantize(Value::from("::BuiltinsTest::Widget"));
        assert_eq!(resolved, Value::from(TypeRef::of::<Widget>("Widget")));
    }

    #[test]
    fn test_constantize_symbol_reference() {
        define_constant("::BuiltinsTest::Port", 8080);

        assert_eq!(
            constantize(Value::sym(":BuiltinsTest::Port")),
            Value::Int(8080)
        );
        // no leading colon in the symbol name: left alone
        assert_eq!(
            constantize(Value::sym("BuiltinsTest::Port")),
            Value::sym("BuiltinsTest::Port")
        );
    }

    #[test]
    fn test_constantize_unknown_reference_unchanged() {
        assert_eq!(
            constantize(Value::from("::BuiltinsTest::Missing")),
            Value::from("::BuiltinsTest::Missing")
        );
        assert_eq!(
            constantize(Value::from("BuiltinsTest")),
            Value::from("BuiltinsTest")
        );
        assert_eq!(constantize(Value::Int(3)), Value::Int(3));
    }

    #[test]
    fn test_undefine_constant() {
        define_constant("BuiltinsTest::Temp", true);
        assert_eq!(constant("::BuiltinsTest::Temp"), Some(Value::Bool(true)));
        assert_eq!(undefine_constant("BuiltinsTest::Temp"), Some(Value::Bool(true)));
        assert_eq!(constant("BuiltinsTest::Temp"), None);
    }
}
