//! Template engine orchestration.
//!
//! [`Engine`] applies the four pipeline stages in fixed order on every
//! render call: conditionals, loops, plain placeholders, filtered
//! placeholders. The loop stage re-enters the whole pipeline per
//! iteration, so nested constructs inside a loop body are fully resolved
//! per element.
//!
//! Rendering is total: malformed constructs, missing variables, wrong
//! loop targets and unknown filters all degrade to defined output (text
//! left verbatim or replaced with the empty string) and never raise.
//! Callers needing bounded work set [`Limits`]; when a ceiling is hit the
//! engine returns partial output with the remaining text unexpanded.

use crate::filters::{FilterFn, FilterSet};
use crate::{conditional, filters, loops, variables};
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::cell::Cell;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `String` - Rendered output; rendering is total and never fails
    fn render(&self, template: &str, context: &Value) -> String;
}

/// Work ceilings for a single render call.
///
/// `max_depth` bounds recursive loop-body rendering; `max_substitutions`
/// bounds the total number of placeholder substitutions and loop
/// iterations. Exceeding either fails closed: the engine stops expanding
/// and returns what it has.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_depth: usize,
    pub max_substitutions: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_depth: 64, max_substitutions: 10_000 }
    }
}

/// The stencil rendering engine.
///
/// Cheap to construct and safe to share across threads: contexts are
/// copied and extended per loop iteration, never mutated in place, so
/// concurrent render calls are independent.
#[derive(Clone)]
pub struct Engine {
    filters: FilterSet,
    limits: Limits,
}

impl Engine {
    /// Creates an engine with the built-in filters and default limits.
    pub fn new() -> Self {
        Self { filters: FilterSet::default(), limits: Limits::default() }
    }

    /// Replaces the work ceilings.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Registers an additional filter.
    pub fn with_filter(mut self, name: &str, filter: FilterFn) -> Self {
        self.filters.register(name, filter);
        self
    }

    /// Renders a template against any serializable context.
    ///
    /// Serialization failure degrades to rendering against an empty
    /// context, consistent with the fail-open contract.
    pub fn render_data<T: Serialize>(&self, template: &str, context: &T) -> String {
        let context = serde_json::to_value(context).unwrap_or_else(|err| {
            warn!("context serialization failed ({err}); rendering with empty context");
            Value::Object(serde_json::Map::new())
        });
        self.render(template, &context)
    }

    fn render_inner(
        &self,
        template: &str,
        context: &Value,
        depth: usize,
        budget: &Cell<usize>,
    ) -> String {
        if depth > self.limits.max_depth {
            warn!("render depth limit {} exceeded; returning text unexpanded", self.limits.max_depth);
            return template.to_string();
        }
        let text = conditional::process(template, context);
        let text = loops::process(&text, context, budget, &mut |body, scope| {
            self.render_inner(body, scope, depth + 1, budget)
        });
        let text = variables::process(&text, context, budget);
        filters::process(&text, context, &self.filters, budget)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl TemplateRenderer for Engine {
    fn render(&self, template: &str, context: &Value) -> String {
        let budget = Cell::new(self.limits.max_substitutions);
        self.render_inner(template, context, 0, &budget)
    }
}
