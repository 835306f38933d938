//! stencil is a fail-open template rendering engine for prompt and report
//! text. It interprets a small Jinja-style language (interpolation,
//! conditionals, for-loops, filters) against an arbitrary JSON context and
//! always produces best-effort output: nothing a template can contain
//! makes `render` fail.

/// Command-line interface module for the stencil binary
pub mod cli;

/// Error types and handling for the surrounding I/O surface
pub mod error;

/// Filter registry and filtered placeholder substitution
pub mod filters;

/// Engine orchestration and the `TemplateRenderer` trait
pub mod renderer;

/// Dotted-path lookup, truthiness, and canonical string coercion
pub mod resolve;

/// Marker detection, escaping, and control-tag scanning
pub mod syntax;

/// Conditional block resolution (`{% if %}` / `{% else %}` / `{% endif %}`)
mod conditional;

/// For-loop expansion with per-iteration scope derivation
mod loops;

/// Plain placeholder substitution
mod variables;
