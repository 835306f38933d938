//! For-loop expansion.
//!
//! Second stage of the render pipeline. Each `{% for item in list %}`
//! block is expanded by rendering its body once per element of the
//! context-held sequence, re-entering the full pipeline recursively, so
//! nested conditionals, loops and placeholders inside the body are fully
//! resolved per element before concatenation.
//!
//! Each iteration renders against a derived context: a shallow copy of
//! the parent with the loop variable bound to the current element. The
//! parent is never mutated, so the binding shadows any outer binding of
//! the same name for that iteration only and never leaks out.

use crate::syntax::{scan, Tag};
use log::{debug, warn};
use serde_json::Value;
use std::cell::Cell;

/// Renders one loop body against a derived scope; supplied by the engine
/// so this stage can re-enter the full pipeline.
pub(crate) type BodyRenderer<'a> = dyn FnMut(&str, &Value) -> String + 'a;

enum Step {
    Splice { start: usize, end: usize, rendered: String },
    Skip(usize),
    Done,
}

/// Expands every loop block in `template` against `context`.
pub(crate) fn process(
    template: &str,
    context: &Value,
    budget: &Cell<usize>,
    render: &mut BodyRenderer<'_>,
) -> String {
    let mut text = template.to_string();
    let mut from = 0;
    loop {
        let step = next_block(&text, context, budget, render, from);
        match step {
            Step::Splice { start, end, rendered } => {
                // The splice is fully rendered; continue after it.
                from = start + rendered.len();
                text.replace_range(start..end, &rendered);
            }
            Step::Skip(next) => from = next,
            Step::Done => break,
        }
    }
    text
}

fn next_block(
    text: &str,
    context: &Value,
    budget: &Cell<usize>,
    render: &mut BodyRenderer<'_>,
    from: usize,
) -> Step {
    let tags = scan(text);

    let Some((open_idx, var, list)) = tags.iter().enumerate().find_map(|(idx, tag)| {
        match tag.tag {
            Tag::For { var, list } if tag.start >= from => Some((idx, var, list)),
            _ => None,
        }
    }) else {
        return Step::Done;
    };

    // Matching endfor, tracking same-kind nesting.
    let mut depth = 0usize;
    let mut end_idx = None;
    for (idx, tag) in tags.iter().enumerate().skip(open_idx + 1) {
        match tag.tag {
            Tag::For { .. } => depth += 1,
            Tag::EndFor => {
                if depth == 0 {
                    end_idx = Some(idx);
                    break;
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    let open = &tags[open_idx];
    let Some(end_idx) = end_idx else {
        debug!("unterminated {{% for %}} block left verbatim");
        return Step::Skip(open.end);
    };

    let body = &text[open.end..tags[end_idx].start];
    let rendered = match context.as_object().and_then(|map| map.get(list)) {
        Some(Value::Array(items)) => {
            let mut out = String::new();
            for item in items {
                if budget.get() == 0 {
                    warn!("substitution budget exhausted; loop over `{list}` truncated");
                    break;
                }
                budget.set(budget.get() - 1);
                let scope = bind(context, var, item.clone());
                out.push_str(&render(body, &scope));
            }
            out
        }
        _ => {
            debug!("loop target `{list}` is missing or not a sequence");
            String::new()
        }
    };

    Step::Splice { start: open.start, end: tags[end_idx].end, rendered }
}

/// Derived context: shallow copy of the parent plus one binding.
fn bind(parent: &Value, name: &str, value: Value) -> Value {
    let mut map = match parent {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    map.insert(name.to_string(), value);
    Value::Object(map)
}
