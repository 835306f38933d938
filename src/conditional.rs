//! Conditional block resolution.
//!
//! First stage of the render pipeline: every `{% if %}` block at the
//! current level is replaced with its chosen branch's raw text. The chosen
//! branch is reinserted unrendered, and scanning resumes at the splice
//! point, so conditionals nested inside a chosen branch are resolved on
//! the next pass before the later stages run.
//!
//! Matching `{% else %}` / `{% endif %}` tags are located by tracking the
//! nesting depth of same-kind opens, not by a single non-greedy match, so
//! an `if` inside an `if` pairs up correctly. Blocks nested inside
//! `{% for %}` spans are skipped here; the loop processor re-enters the
//! full pipeline per iteration and resolves them with the loop variable
//! in scope.

use crate::resolve::{coerce, lookup, Resolution};
use crate::syntax::{scan, Tag};
use log::debug;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][\w.]*$").unwrap());

static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z_][\w.]*)\s*(==|!=)\s*"([^"]*)"$"#).unwrap()
});

enum Step {
    Splice { start: usize, end: usize, chosen: String },
    Skip(usize),
    Done,
}

/// Resolves every conditional block in `template` against `context`.
pub(crate) fn process(template: &str, context: &Value) -> String {
    let mut text = template.to_string();
    let mut from = 0;
    loop {
        let step = next_block(&text, context, from);
        match step {
            Step::Splice { start, end, chosen } => {
                text.replace_range(start..end, &chosen);
                // Rescan from the splice so nested ifs in the chosen
                // branch are handled next.
                from = start;
            }
            Step::Skip(next) => from = next,
            Step::Done => break,
        }
    }
    text
}

fn next_block(text: &str, context: &Value, from: usize) -> Step {
    let tags = scan(text);

    // First `if` at or after `from` that is not inside a for-block.
    let mut for_depth = 0usize;
    let mut found = None;
    for (idx, tag) in tags.iter().enumerate() {
        match tag.tag {
            Tag::For { .. } => for_depth += 1,
            Tag::EndFor => for_depth = for_depth.saturating_sub(1),
            Tag::If(condition) if for_depth == 0 && tag.start >= from => {
                found = Some((idx, condition));
                break;
            }
            _ => {}
        }
    }
    let Some((open_idx, condition)) = found else {
        return Step::Done;
    };

    // Locate the depth-0 else and the matching endif.
    let mut if_depth = 0usize;
    let mut else_idx = None;
    let mut end_idx = None;
    for (idx, tag) in tags.iter().enumerate().skip(open_idx + 1) {
        match tag.tag {
            Tag::If(_) => if_depth += 1,
            Tag::Else if if_depth == 0 => {
                if else_idx.is_none() {
                    else_idx = Some(idx);
                }
            }
            Tag::EndIf => {
                if if_depth == 0 {
                    end_idx = Some(idx);
                    break;
                }
                if_depth -= 1;
            }
            _ => {}
        }
    }

    let open = &tags[open_idx];
    let Some(end_idx) = end_idx else {
        debug!("unterminated {{% if %}} block left verbatim");
        return Step::Skip(open.end);
    };

    let chosen = if evaluate(condition, context) {
        let body_end = else_idx.map_or(tags[end_idx].start, |idx| tags[idx].start);
        text[open.end..body_end].to_string()
    } else {
        match else_idx {
            Some(idx) => text[tags[idx].end..tags[end_idx].start].to_string(),
            None => String::new(),
        }
    };

    Step::Splice { start: open.start, end: tags[end_idx].end, chosen }
}

/// Evaluates a condition against the context. Grammar, first match wins:
/// bare path (truthiness), `path == "lit"` / `path != "lit"`, `not path`.
/// Anything else evaluates to false; conditions never raise.
pub(crate) fn evaluate(condition: &str, context: &Value) -> bool {
    let condition = condition.trim();
    if PATH_RE.is_match(condition) {
        return lookup(context, condition).is_truthy();
    }
    if let Some(caps) = COMPARISON_RE.captures(condition) {
        let equal = match lookup(context, &caps[1]) {
            Resolution::Resolved(value) => coerce(&value) == caps[3],
            // Undefined compares unequal to every literal.
            Resolution::Undefined => false,
        };
        return if &caps[2] == "==" { equal } else { !equal };
    }
    if let Some(rest) = condition.strip_prefix("not ") {
        let rest = rest.trim();
        if PATH_RE.is_match(rest) {
            return !lookup(context, rest).is_truthy();
        }
    }
    debug!("unrecognized condition `{condition}` evaluates to false");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluate_grammar() {
        let context = json!({"a": "x", "n": 0, "t": true});
        assert!(evaluate("a", &context));
        assert!(!evaluate("n", &context));
        assert!(!evaluate("missing", &context));
        assert!(evaluate("a == \"x\"", &context));
        assert!(!evaluate("a != \"x\"", &context));
        assert!(evaluate("missing != \"x\"", &context));
        assert!(evaluate("not n", &context));
        assert!(!evaluate("not t", &context));
        assert!(!evaluate("a < \"x\"", &context));
    }

    #[test]
    fn test_nested_if_blocks() {
        let template = "{% if a %}A{% if b %}B{% endif %}{% else %}C{% endif %}";
        assert_eq!(process(template, &json!({"a": true, "b": true})), "AB");
        assert_eq!(process(template, &json!({"a": true, "b": false})), "A");
        assert_eq!(process(template, &json!({"a": false})), "C");
    }

    #[test]
    fn test_if_inside_for_untouched() {
        let template = "{% for i in xs %}{% if i %}x{% endif %}{% endfor %}";
        assert_eq!(process(template, &json!({})), template);
    }

    #[test]
    fn test_unterminated_if_left_verbatim() {
        let template = "{% if a %}open";
        assert_eq!(process(template, &json!({"a": true})), template);
    }
}
