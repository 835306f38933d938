//! Plain placeholder substitution.
//!
//! Third stage of the render pipeline: bare `{{ path }}` placeholders
//! (no filter pipe) are replaced with the coerced value of the dotted
//! path. Unresolved placeholders stay verbatim so failed substitutions
//! remain visible downstream instead of silently disappearing.

use crate::resolve::{coerce, lookup, Resolution};
use log::debug;
use regex::{Captures, Regex};
use serde_json::Value;
use std::cell::Cell;
use std::sync::LazyLock;

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][\w.]*)\s*\}\}").unwrap()
});

/// Substitutes every resolvable bare placeholder in `template`.
pub(crate) fn process(template: &str, context: &Value, budget: &Cell<usize>) -> String {
    VAR_RE
        .replace_all(template, |caps: &Captures| {
            let token = &caps[0];
            let path = &caps[1];
            if budget.get() == 0 {
                return token.to_string();
            }
            match lookup(context, path) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitutes_and_leaves_undefined() {
        let budget = Cell::new(100);
        let context = json!({"a": "x", "u": {"name": "Ann"}});
        assert_eq!(process("{{a}} {{u.name}} {{b}}", &context, &budget), "x Ann {{b}}");
    }

    #[test]
    fn test_filtered_placeholders_untouched() {
        let budget = Cell::new(100);
        let context = json!({"a": "x"});
        assert_eq!(process("{{ a | upper }}", &context, &budget), "{{ a | upper }}");
    }

    #[test]
    fn test_budget_stops_substitution() {
        let budget = Cell::new(1);
        let context = json!({"a": "x"});
        assert_eq!(process("{{a}}{{a}}", &context, &budget), "x{{a}}");
    }
}
