//! Dotted-path lookup and value coercion against a render context.
//!
//! Everything downstream of the tag scanners goes through [`lookup`]: the
//! result is a tagged [`Resolution`] so that the "leave the placeholder
//! verbatim" vs "substitute a value" policy is an explicit branch at each
//! call site rather than an implicit fallback.

use serde_json::Value;

/// Outcome of resolving a dotted path against a context.
///
/// `Undefined` means a path segment was absent or an intermediate value was
/// not a mapping. It is distinct from resolving to an explicit JSON `null`,
/// which is a defined (if falsy and empty-printing) value.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The path resolved to a value held by the context.
    Resolved(Value),
    /// The path could not be resolved; placeholders stay verbatim.
    Undefined,
}

impl Resolution {
    /// Truthiness of the resolution: `Undefined`, `null`, `false`, `0` and
    /// the empty string are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Resolution::Resolved(value) => is_truthy(value),
            Resolution::Undefined => false,
        }
    }
}

/// Resolves a dot-separated path (`user.name`) by sequential key lookup
/// into nested mappings.
///
/// # Arguments
/// * `context` - Context value, normally a JSON object
/// * `path` - Dot-separated identifier chain
///
/// # Returns
/// * `Resolution::Undefined` if any segment is absent or an intermediate
///   value is not a mapping; `Resolution::Resolved` otherwise.
pub fn lookup(context: &Value, path: &str) -> Resolution {
    let mut current = context;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => match map.get(segment) {
                Some(value) => current = value,
                None => return Resolution::Undefined,
            },
            _ => return Resolution::Undefined,
        }
    }
    Resolution::Resolved(current.clone())
}

/// Truthiness of a context value, mirroring the condition grammar.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Canonical string coercion used for every substitution.
///
/// Strings print verbatim, numbers and booleans as their JSON display,
/// explicit `null` as the empty string. Sequences join their coerced
/// elements with `", "`; mappings print `key: value` pairs in insertion
/// order joined with `", "`, so output is reproducible across runs.
pub fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            items.iter().map(coerce).collect::<Vec<_>>().join(", ")
        }
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, coerce(value)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let context = json!({"user": {"name": "Ann"}});
        assert_eq!(
            lookup(&context, "user.name"),
            Resolution::Resolved(json!("Ann"))
        );
        assert_eq!(lookup(&context, "user.email"), Resolution::Undefined);
        assert_eq!(lookup(&context, "user.name.first"), Resolution::Undefined);
    }

    #[test]
    fn test_null_is_defined() {
        let context = json!({"a": null});
        assert_eq!(lookup(&context, "a"), Resolution::Resolved(Value::Null));
        assert_eq!(lookup(&context, "b"), Resolution::Undefined);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(1)));
        // Empty sequences are truthy; only the five falsy shapes are not.
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_coerce_composites() {
        assert_eq!(coerce(&json!([1, "b", true])), "1, b, true");
        assert_eq!(coerce(&json!({"a": 1, "b": "x"})), "a: 1, b: x");
        assert_eq!(coerce(&json!(null)), "");
    }
}
