//! Helpers for inspecting the tiered JIT's profiling output.
//!
//! None of these feed template generation. They turn the emulator's
//! profiling dumps into text a developer can read or plot:
//!
//! - [`graph`] draws the block graph from a profile dump as Graphviz DOT;
//! - [`perf`] tabulates `perf stat` logs as CSV;
//! - [`hotspot`] lines up two hotspot traces taken with and without block
//!   chaining.

pub mod graph;
pub mod hotspot;
pub mod perf;

use crate::error::TemplategenError;

fn malformed(source_name: &str, message: impl Into<String>) -> TemplategenError {
    TemplategenError::MalformedProfile {
        source_name: source_name.to_owned(),
        message: message.into(),
    }
}

/// Returns what follows `label` on `line`, trimmed.
fn labelled_value<'l>(source_name: &str, line: &'l str, label: &str) -> Result<&'l str, TemplategenError> {
    line.find(label)
        .and_then(|at| line.get(at + label.len()..))
        .map(str::trim)
        .ok_or_else(|| malformed(source_name, format!("expected `{label}` in `{line}`")))
}
