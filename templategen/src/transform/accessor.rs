//! Instruction-record field accessors recognised in operation bodies.

use std::fmt;

use crate::source::lexical::{identifier_at, starts_token};

const PREFIX: &str = "ir->";

/// A field of the decoded instruction record whose value is substituted when
/// a trace is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandAccessor {
    /// Destination register index.
    Rd,
    /// First source register index.
    Rs1,
    /// Second source register index.
    Rs2,
    /// Third source register index.
    Rs3,
    /// Immediate.
    Imm,
    /// Secondary immediate.
    Imm2,
    /// Instruction length in bytes.
    InsnLen,
    /// Shift amount.
    Shamt,
}

impl OperandAccessor {
    /// Every accessor, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Rd,
        Self::Rs1,
        Self::Rs2,
        Self::Rs3,
        Self::Imm,
        Self::Imm2,
        Self::InsnLen,
        Self::Shamt,
    ];

    /// The record field name.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Rd => "rd",
            Self::Rs1 => "rs1",
            Self::Rs2 => "rs2",
            Self::Rs3 => "rs3",
            Self::Imm => "imm",
            Self::Imm2 => "imm2",
            Self::InsnLen => "insn_len",
            Self::Shamt => "shamt",
        }
    }

    /// Looks up the accessor for a field name. Only exact names match.
    #[must_use]
    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|accessor| accessor.field() == field)
    }
}

impl fmt::Display for OperandAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.field())
    }
}

/// An accessor occurrence within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorMatch {
    /// Byte offset of the `ir` token.
    pub start: usize,
    /// Byte offset just past the field name.
    pub end: usize,
    /// The accessor found.
    pub accessor: OperandAccessor,
}

/// Finds every accessor in `line`, left to right.
///
/// A match is `ir->` at an identifier boundary followed by a whole field
/// name; `ir->rdx` or `xir->rd` are not accessors.
#[must_use]
pub fn scan_accessors(line: &str) -> Vec<AccessorMatch> {
    line.match_indices(PREFIX)
        .filter(|&(start, _)| starts_token(line, start))
        .filter_map(|(start, _)| {
            let field = identifier_at(line, start + PREFIX.len())?;
            let accessor = OperandAccessor::from_field(field)?;
            Some(AccessorMatch {
                start,
                end: start + PREFIX.len() + field.len(),
                accessor,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn accessors(line: &str) -> Vec<OperandAccessor> {
        scan_accessors(line).into_iter().map(|found| found.accessor).collect()
    }

    #[rstest]
    fn finds_accessors_in_order() {
        assert_eq!(
            accessors("rv->X[ir->rd] = rv->X[ir->rs1] + ir->imm;"),
            [OperandAccessor::Rd, OperandAccessor::Rs1, OperandAccessor::Imm]
        );
    }

    #[rstest]
    #[case("x = ir->rdx;")]
    #[case("x = air->rd;")]
    #[case("x = ir->opcode;")]
    #[case("x = ir . rd;")]
    fn ignores_partial_and_unknown_fields(#[case] line: &str) {
        assert!(accessors(line).is_empty());
    }

    #[rstest]
    fn match_spans_the_whole_accessor() {
        let line = "pc + ir->insn_len;";
        let found = scan_accessors(line);
        let span = found
            .first()
            .and_then(|hit| line.get(hit.start..hit.end))
            .expect("one accessor");
        assert_eq!(span, "ir->insn_len");
    }

    #[rstest]
    fn display_is_the_c_expression() {
        assert_eq!(OperandAccessor::Shamt.to_string(), "ir->shamt");
        assert_eq!(OperandAccessor::from_field("imm2"), Some(OperandAccessor::Imm2));
    }
}
