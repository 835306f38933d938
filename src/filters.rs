//! Filtered placeholder substitution.
//!
//! Final stage of the render pipeline: `{{ path | name }}` and
//! `{{ path | name(arg, ...) }}` placeholders resolve the path first,
//! then apply the named filter from the registry. Filters are pure
//! `(value, args) -> value` functions. An unknown filter name passes the
//! value through unchanged, and a still-undefined final value leaves the
//! placeholder verbatim, matching the plain-placeholder invariant.

use crate::resolve::{coerce, lookup, Resolution};
use indexmap::IndexMap;
use log::debug;
use regex::{Captures, Regex};
use serde_json::Value;
use std::cell::Cell;
use std::sync::LazyLock;

static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][\w.]*)\s*\|\s*([A-Za-z_]\w*)\s*(?:\(([^()]*)\))?\s*\}\}")
        .unwrap()
});

/// A pure post-processing transform applied to a resolved value.
pub type FilterFn = fn(Resolution, &[String]) -> Resolution;

/// Named filter registry. Built-ins are registered up front; callers may
/// add their own with [`FilterSet::register`].
#[derive(Clone)]
pub struct FilterSet {
    filters: IndexMap<String, FilterFn>,
}

impl Default for FilterSet {
    fn default() -> Self {
        let mut set = Self { filters: IndexMap::new() };
        set.register("default", default_filter);
        set.register("upper", upper);
        set.register("lower", lower);
        set.register("capitalize", capitalize);
        set.register("length", length);
        set.register("join", join);
        set.register("trim", trim);
        set
    }
}

impl FilterSet {
    /// Registers a filter under `name`, replacing any existing one.
    pub fn register(&mut self, name: impl Into<String>, filter: FilterFn) {
        self.filters.insert(name.into(), filter);
    }

    fn get(&self, name: &str) -> Option<FilterFn> {
        self.filters.get(name).copied()
    }
}

/// Substitutes every filtered placeholder in `template`.
pub(crate) fn process(
    template: &str,
    context: &Value,
    filters: &FilterSet,
    budget: &Cell<usize>,
) -> String {
    FILTER_RE
        .replace_all(template, |caps: &Captures| {
            let token = &caps[0];
            if budget.get() == 0 {
                return token.to_string();
            }
            let path = &caps[1];
            let name = &caps[2];
            let args = caps.get(3).map(|m| parse_args(m.as_str())).unwrap_or_default();

            let resolved = lookup(context, path);
            let filtered = match filters.get(name) {
                Some(filter) => filter(resolved, &args),
                None => {
                    debug!("unknown filter `{name}`; value passed through");
                    resolved
                }
            };
            match filtered {
                Resolution::Resolved(value) => {
                    budget.set(budget.get() - 1);
                    coerce(&value)
                }
                Resolution::Undefined => {
                    debug!("unresolved placeholder `{path}` left verbatim");
                    token.to_string()
                }
            }
        })
        .into_owned()
}

/// Splits a filter argument list on top-level commas and strips one pair
/// of surrounding quotes per argument. Commas inside quotes are literal.
fn parse_args(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in raw.chars() {
        match (quote, ch) {
            (Some(q), _) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            (None, '"') | (None, '\'') => {
                current.push(ch);
                quote = Some(ch);
            }
            (None, ',') => args.push(strip_quotes(&std::mem::take(&mut current))),
            (None, _) => current.push(ch),
        }
    }
    args.push(strip_quotes(&current));
    args
}

fn strip_quotes(raw: &str) -> String {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if trimmed.len() >= 2
        && ((bytes[0] == b'"' && bytes[trimmed.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[trimmed.len() - 1] == b'\''))
    {
        return trimmed[1..trimmed.len() - 1].to_string();
    }
    trimmed.to_string()
}

/// Applies a string transform to the coerced value, keeping `Undefined`
/// untouched so the verbatim invariant holds.
fn map_coerced(input: Resolution, transform: impl FnOnce(&str) -> String) -> Resolution {
    match input {
        Resolution::Resolved(value) => {
            Resolution::Resolved(Value::String(transform(&coerce(&value))))
        }
        Resolution::Undefined => Resolution::Undefined,
    }
}

fn default_filter(input: Resolution, args: &[String]) -> Resolution {
    let fallback = args.first().cloned().unwrap_or_default();
    match input {
        Resolution::Undefined | Resolution::Resolved(Value::Null) => {
            Resolution::Resolved(Value::String(fallback))
        }
        Resolution::Resolved(Value::String(ref s)) if s.is_empty() => {
            Resolution::Resolved(Value::String(fallback))
        }
        other => other,
    }
}

fn upper(input: Resolution, _args: &[String]) -> Resolution {
    map_coerced(input, |s| s.to_uppercase())
}

fn lower(input: Resolution, _args: &[String]) -> Resolution {
    map_coerced(input, |s| s.to_lowercase())
}

fn capitalize(input: Resolution, _args: &[String]) -> Resolution {
    map_coerced(input, |s| {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
            None => String::new(),
        }
    })
}

fn length(input: Resolution, _args: &[String]) -> Resolution {
    match input {
        Resolution::Resolved(Value::String(s)) => {
            Resolution::Resolved(Value::from(s.chars().count()))
        }
        Resolution::Resolved(Value::Array(items)) => {
            Resolution::Resolved(Value::from(items.len()))
        }
        Resolution::Resolved(_) => Resolution::Resolved(Value::from(0)),
        Resolution::Undefined => Resolution::Undefined,
    }
}

fn join(input: Resolution, args: &[String]) -> Resolution {
    match input {
        Resolution::Resolved(Value::Array(items)) => {
            let separator = args.first().map(String::as_str).unwrap_or(", ");
            let joined =
                items.iter().map(coerce).collect::<Vec<_>>().join(separator);
            Resolution::Resolved(Value::String(joined))
        }
        other => other,
    }
}

fn trim(input: Resolution, _args: &[String]) -> Resolution {
    map_coerced(input, |s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(template: &str, context: &Value) -> String {
        let budget = Cell::new(100);
        process(template, context, &FilterSet::default(), &budget)
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(apply("{{a|default(\"z\")}}", &json!({"a": ""})), "z");
        assert_eq!(apply("{{a|default(\"z\")}}", &json!({"a": null})), "z");
        assert_eq!(apply("{{a|default(\"z\")}}", &json!({})), "z");
        assert_eq!(apply("{{a|default(\"z\")}}", &json!({"a": "v"})), "v");
    }

    #[test]
    fn test_case_filters() {
        let context = json!({"a": "hEllo"});
        assert_eq!(apply("{{a|upper}}", &context), "HELLO");
        assert_eq!(apply("{{a|lower}}", &context), "hello");
        assert_eq!(apply("{{a|capitalize}}", &context), "Hello");
    }

    #[test]
    fn test_length_filter() {
        assert_eq!(apply("{{a|length}}", &json!({"a": "abcd"})), "4");
        assert_eq!(apply("{{a|length}}", &json!({"a": [1, 2]})), "2");
        assert_eq!(apply("{{a|length}}", &json!({"a": true})), "0");
        assert_eq!(apply("{{a|length}}", &json!({})), "{{a|length}}");
    }

    #[test]
    fn test_join_filter() {
        let context = json!({"xs": ["a", "b", "c"]});
        assert_eq!(apply("{{xs|join(\"-\")}}", &context), "a-b-c");
        assert_eq!(apply("{{xs|join}}", &context), "a, b, c");
        // Separator containing a comma stays one argument.
        assert_eq!(apply("{{xs|join(\", \")}}", &context), "a, b, c");
        assert_eq!(apply("{{n|join(\"-\")}}", &json!({"n": 5})), "5");
    }

    #[test]
    fn test_unknown_filter_passes_through() {
        assert_eq!(apply("{{a|nope}}", &json!({"a": "v"})), "v");
        assert_eq!(apply("{{a|nope}}", &json!({})), "{{a|nope}}");
    }

    #[test]
    fn test_trim_filter() {
        assert_eq!(apply("{{a|trim}}", &json!({"a": "  x  "})), "x");
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(""), Vec::<String>::new());
        assert_eq!(parse_args("\"a\", 'b', c"), vec!["a", "b", "c"]);
        assert_eq!(parse_args("\"a,b\""), vec!["a,b"]);
    }

    #[test]
    fn test_custom_filter_registration() {
        fn shout(input: Resolution, _args: &[String]) -> Resolution {
            match input {
                Resolution::Resolved(value) => {
                    Resolution::Resolved(Value::String(format!("{}!", coerce(&value))))
                }
                Resolution::Undefined => Resolution::Undefined,
            }
        }
        let mut filters = FilterSet::default();
        filters.register("shout", shout);
        let budget = Cell::new(100);
        let out = process("{{a|shout}}", &json!({"a": "hi"}), &filters, &budget);
        assert_eq!(out, "hi!");
    }
}
