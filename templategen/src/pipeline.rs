//! Wiring of the generation stages.
//!
//! ```text
//! flags ──► resolve ──► ExclusionSet ─┬─► extract_declarations ─┐
//! operation table ──► collect ────────┴─► transform (filtered) ─┴─► assemble ──► render
//! ```

use std::fmt;

use crate::check::digest;
use crate::collect::{OperationRecord, collect_operations};
use crate::error::TemplategenError;
use crate::extract::extract_declarations;
use crate::features::{ExclusionReason, ExclusionSet};
use crate::source::SourceSet;
use crate::template::{TemplateOutput, assemble, render};
use crate::transform::transform;

/// Runs extraction, collection and transformation, returning the assembled
/// document.
///
/// # Errors
///
/// Propagates the first stage failure; nothing partial is returned.
pub fn generate(
    sources: &SourceSet,
    exclusions: &ExclusionSet,
) -> Result<TemplateOutput, TemplategenError> {
    let declarations = extract_declarations(sources, exclusions)?;
    let records = collect_operations(&sources.operations)?;
    let total = records.len();

    let groups: Vec<_> = records
        .iter()
        .filter(|record| !exclusions.contains(&record.mnemonic))
        .map(transform)
        .collect();
    tracing::debug!(emitted = groups.len(), excluded = total - groups.len(), "transformed operations");

    Ok(assemble(declarations, groups))
}

/// Generates and renders the document, logging a run summary.
///
/// # Errors
///
/// See [`generate`].
pub fn generate_rendered(
    sources: &SourceSet,
    exclusions: &ExclusionSet,
) -> Result<String, TemplategenError> {
    let output = generate(sources, exclusions)?;
    let rendered = render(&output);
    tracing::info!(
        operations = output.groups.len(),
        declarations = output.declarations.len(),
        excluded_mnemonics = exclusions.len(),
        sha256 = %digest(&rendered),
        "generated template"
    );
    Ok(rendered)
}

/// What a run does with one collected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The operation is templated.
    Emit,
    /// The operation is excluded for the given reason.
    Skip(ExclusionReason),
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emit => f.write_str("emit"),
            Self::Skip(reason) => write!(f, "skip ({reason})"),
        }
    }
}

/// One line of a generation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Operation mnemonic.
    pub mnemonic: String,
    /// Whether it is emitted.
    pub decision: Decision,
}

/// Lists every collected operation with its decision, in table order.
///
/// # Errors
///
/// Propagates collection failures.
pub fn plan(sources: &SourceSet, exclusions: &ExclusionSet) -> Result<Vec<PlanEntry>, TemplategenError> {
    let records = collect_operations(&sources.operations)?;
    Ok(records
        .into_iter()
        .map(|OperationRecord { mnemonic, .. }| {
            let decision = exclusions.reason(&mnemonic).map_or(Decision::Emit, Decision::Skip);
            PlanEntry { mnemonic, decision }
        })
        .collect())
}

/// Formats a plan as one `<mnemonic> <decision>` line per entry.
#[must_use]
pub fn format_plan(entries: &[PlanEntry]) -> String {
    let width = entries.iter().map(|entry| entry.mnemonic.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|entry| format!("{:width$}  {}\n", entry.mnemonic, entry.decision))
        .collect()
}
