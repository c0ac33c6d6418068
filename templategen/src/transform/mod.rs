//! Rewriting of interpreter operation bodies into emission directives.
//!
//! A body is first normalised into code that compiles inside the template's
//! single entry function: fault checks are dropped (the trace compiler
//! handles them) and scratch locals lose their declarations so they bind to
//! the entry point's shared locals. Each remaining line then becomes either a
//! verbatim literal or a format string whose record-field accesses are
//! positional placeholders.

pub mod accessor;

pub use accessor::{AccessorMatch, OperandAccessor, scan_accessors};

use crate::collect::OperationRecord;
use crate::source::lexical::{find_token, identifier_at, matching_close, skip_whitespace, starts_token};

/// Prefix shared by every fault-check macro.
pub const FAULT_CHECK_PREFIX: &str = "RV_EXC";

/// Width qualifiers removed from local declarations, trailing space included.
pub const WIDTH_QUALIFIERS: [&str; 4] = [
    "const int32_t ",
    "const uint32_t ",
    "const int64_t ",
    "const uint64_t ",
];

/// Locals declared once by the template entry point.
pub const SCRATCH_LOCALS: [&str; 8] = ["tmp", "a", "b", "a_sign", "b_sign", "data", "bits", "addr"];

const SCRATCH_TYPE: &str = "uint32_t";

/// Placeholder substituted for each accessor in a parameterised format.
pub const PLACEHOLDER: &str = "%u";

/// One unit of template output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionDirective {
    /// A line appended verbatim.
    Literal(String),
    /// A line whose accessors were replaced by [`PLACEHOLDER`]s, filled from
    /// `args` in order.
    Parameterized {
        /// `printf`-style format; pre-existing `%` are doubled.
        format: String,
        /// One accessor per placeholder, left to right.
        args: Vec<OperandAccessor>,
    },
}

/// The directives generated for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationGroup {
    /// Instruction mnemonic.
    pub mnemonic: String,
    /// Directives in body line order.
    pub directives: Vec<EmissionDirective>,
}

/// Transforms one collected operation.
#[must_use]
pub fn transform(record: &OperationRecord) -> OperationGroup {
    let body = normalize_body(&record.body);
    let directives = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(line_directive)
        .collect();
    OperationGroup {
        mnemonic: record.mnemonic.clone(),
        directives,
    }
}

/// Removes fault checks, width qualifiers and scratch-local declarations.
#[must_use]
pub fn normalize_body(body: &str) -> String {
    let mut text = remove_fault_checks(body);
    for qualifier in WIDTH_QUALIFIERS {
        text = remove_token(&text, qualifier);
    }
    strip_scratch_declarations(&text)
}

/// Converts one body line into a directive.
#[must_use]
pub fn line_directive(line: &str) -> EmissionDirective {
    let found = scan_accessors(line);
    if found.is_empty() {
        return EmissionDirective::Literal(line.to_owned());
    }

    let mut format = String::with_capacity(line.len());
    let mut cursor = 0;
    for hit in &found {
        format.push_str(&escape_percent(line.get(cursor..hit.start).unwrap_or_default()));
        format.push_str(PLACEHOLDER);
        cursor = hit.end;
    }
    format.push_str(&escape_percent(line.get(cursor..).unwrap_or_default()));

    EmissionDirective::Parameterized {
        format,
        args: found.into_iter().map(|hit| hit.accessor).collect(),
    }
}

fn escape_percent(text: &str) -> String {
    text.replace('%', "%%")
}

/// Drops `RV_EXC*(...);` invocations plus one following whitespace
/// character.
fn remove_fault_checks(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut cursor = 0;
    let mut from = 0;
    while let Some(start) = body.get(from..).and_then(|tail| tail.find(FAULT_CHECK_PREFIX)).map(|at| from + at) {
        from = start + FAULT_CHECK_PREFIX.len();
        if !starts_token(body, start) {
            continue;
        }
        let Some(end) = fault_check_end(body, start) else {
            continue;
        };
        out.push_str(body.get(cursor..start).unwrap_or_default());
        cursor = end;
        from = end;
    }
    out.push_str(body.get(cursor..).unwrap_or_default());
    out
}

/// Offset just past the invocation starting at `start`, including one
/// trailing whitespace character.
fn fault_check_end(body: &str, start: usize) -> Option<usize> {
    let name = identifier_at(body, start)?;
    let open = skip_whitespace(body, start + name.len());
    if !body.get(open..)?.starts_with('(') {
        return None;
    }
    let close = matching_close(body, open, '(', ')')?;
    let semicolon = skip_whitespace(body, close + 1);
    if !body.get(semicolon..)?.starts_with(';') {
        return None;
    }
    let after = semicolon + 1;
    let trailing = body
        .get(after..)
        .and_then(|tail| tail.chars().next())
        .filter(|ch| ch.is_whitespace())
        .map_or(0, char::len_utf8);
    Some(after + trailing)
}

/// Removes every occurrence of `needle` that starts at an identifier
/// boundary.
fn remove_token(text: &str, needle: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(start) = find_token(text, needle, cursor) {
        out.push_str(text.get(cursor..start).unwrap_or_default());
        cursor = start + needle.len();
    }
    out.push_str(text.get(cursor..).unwrap_or_default());
    out
}

/// Turns `uint32_t tmp = ...` into `tmp = ...` for each scratch local.
fn strip_scratch_declarations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut from = 0;
    while let Some(start) = find_token(text, SCRATCH_TYPE, from) {
        from = start + SCRATCH_TYPE.len();
        let name_at = skip_whitespace(text, from);
        let is_scratch = name_at > from
            && identifier_at(text, name_at).is_some_and(|name| SCRATCH_LOCALS.iter().any(|local| *local == name));
        if is_scratch {
            out.push_str(text.get(cursor..start).unwrap_or_default());
            cursor = name_at;
            from = name_at;
        }
    }
    out.push_str(text.get(cursor..).unwrap_or_default());
    out
}
