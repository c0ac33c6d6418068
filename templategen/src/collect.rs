//! Collection of `RVOP(mnemonic, { body })` definitions from the operation
//! table.

use crate::error::TemplategenError;
use crate::source::SourceArtifact;
use crate::source::lexical::{find_token, identifier_at, matching_close, skip_whitespace};

const RVOP: &str = "RVOP(";

/// One operation definition as written in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// Instruction mnemonic, e.g. `addi`.
    pub mnemonic: String,
    /// Text between the body's outer braces, verbatim.
    pub body: String,
}

/// Returns every operation definition in `table`, in source order.
///
/// Occurrences of `RVOP(` that are not followed by `identifier, {` (the
/// macro's own definition, for instance) are skipped. Repeated mnemonics are
/// kept; each produces its own record.
///
/// # Errors
///
/// Returns [`TemplategenError::Extraction`] when a body's opening brace has
/// no balanced closing brace.
pub fn collect_operations(table: &SourceArtifact) -> Result<Vec<OperationRecord>, TemplategenError> {
    let text = table.text();
    let mut records: Vec<OperationRecord> = Vec::new();
    let mut from = 0;

    while let Some(start) = find_token(text, RVOP, from) {
        from = start + RVOP.len();
        let Some((mnemonic, open)) = definition_head(text, from) else {
            continue;
        };
        let close = matching_close(text, open, '{', '}').ok_or_else(|| {
            TemplategenError::extraction(table.name(), format!("closing brace of `RVOP({mnemonic}, {{`"))
        })?;
        let body = text.get(open + 1..close).unwrap_or_default();

        if records.iter().any(|record| record.mnemonic == mnemonic) {
            tracing::debug!(mnemonic, "operation defined more than once");
        }
        records.push(OperationRecord {
            mnemonic: mnemonic.to_owned(),
            body: body.to_owned(),
        });
        from = close + 1;
    }

    tracing::debug!(count = records.len(), artifact = table.name(), "collected operations");
    Ok(records)
}

/// Parses `identifier , {` starting at `offset`, returning the identifier and
/// the offset of the brace.
fn definition_head(text: &str, offset: usize) -> Option<(&str, usize)> {
    let name_at = skip_whitespace(text, offset);
    let mnemonic = identifier_at(text, name_at)?;
    let comma = skip_whitespace(text, name_at + mnemonic.len());
    if !text.get(comma..)?.starts_with(',') {
        return None;
    }
    let open = skip_whitespace(text, comma + 1);
    text.get(open..)?.starts_with('{').then_some((mnemonic, open))
}
