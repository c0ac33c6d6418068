//! Assembly of the template document.
//!
//! The document has a fixed shape: a header with includes and sign-extension
//! helpers, the extracted declarations, the entry point with the scratch
//! locals shared by every operation, then one group per templated
//! operation. [`render`] serialises it.

mod render;

pub use render::{escape_c_string, render};

use crate::extract::Declaration;
use crate::transform::OperationGroup;

/// Lines opening the prologue.
pub const HEADER_LINES: [&str; 10] = [
    "#include <stdint.h>",
    "#include <stdbool.h>",
    "static inline uint32_t sign_extend_h(const uint32_t x)",
    "{",
    "    return (int32_t) ((int16_t) x);",
    "}",
    "static inline uint32_t sign_extend_b(const uint32_t x)",
    "{",
    "    return (int32_t) ((int8_t) x);",
    "}",
];

/// The entry point signature and its scratch locals. Operation bodies rely
/// on these declarations once their own have been stripped.
pub const ENTRY_LINES: [&str; 6] = [
    "bool start(riscv_t *rv, uint64_t cycle, uint32_t PC) {",
    "  uint32_t pc, addr, udividend, udivisor, tmp, data, mask, ures, a, b, a_sign, b_sign, bits, jump_to;",
    "  int32_t dividend, divisor, res;",
    "  int64_t multiplicand, multiplier;",
    "  uint64_t umultiplier;",
    "  memory_t *m = ((state_t *)rv->userdata)->mem;",
];

/// The complete template, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOutput {
    /// Include and helper lines.
    pub header: Vec<String>,
    /// Extracted declarations, in prologue order.
    pub declarations: Vec<Declaration>,
    /// Entry point lines.
    pub entry: Vec<String>,
    /// Operation groups, in operation-table order.
    pub groups: Vec<OperationGroup>,
}

impl TemplateOutput {
    /// Every prologue line: header, declarations, then entry point.
    pub fn prologue_lines(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .chain(self.declarations.iter().flat_map(|decl| decl.lines.iter()))
            .chain(self.entry.iter())
            .map(String::as_str)
    }
}

/// Builds the document from extracted declarations and surviving groups.
#[must_use]
pub fn assemble(declarations: Vec<Declaration>, groups: Vec<OperationGroup>) -> TemplateOutput {
    TemplateOutput {
        header: HEADER_LINES.iter().copied().map(str::to_owned).collect(),
        declarations,
        entry: ENTRY_LINES.iter().copied().map(str::to_owned).collect(),
        groups,
    }
}
