//! Evaluation of known preprocessor conditionals.
//!
//! The internal CPU-state header guards members behind `RV32_HAS(...)`
//! checks. The template is compiled without the interpreter's configuration
//! header, so the conditions whose outcome the generator knows are resolved
//! here. Unknown conditionals pass through untouched.

use crate::error::TemplategenError;

/// A `#if` line and whether its condition holds for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// The directive, matched against whole trimmed lines.
    pub directive: String,
    /// Whether the `#if` branch is kept (otherwise the `#else` branch is).
    pub holds: bool,
}

impl Condition {
    /// Creates a condition for `directive`.
    pub fn new(directive: impl Into<String>, holds: bool) -> Self {
        Self {
            directive: directive.into(),
            holds,
        }
    }
}

/// Replaces every conditional block listed in `conditions` with the branch
/// that applies.
///
/// # Errors
///
/// Returns [`TemplategenError::Extraction`] when a matched block has no
/// closing `#endif`.
pub fn evaluate(
    artifact: &str,
    text: &str,
    conditions: &[Condition],
) -> Result<String, TemplategenError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut kept = Vec::with_capacity(lines.len());
    emit(artifact, &lines, conditions, &mut kept)?;
    let mut out = kept.join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn emit<'t>(
    artifact: &str,
    lines: &[&'t str],
    conditions: &[Condition],
    kept: &mut Vec<&'t str>,
) -> Result<(), TemplategenError> {
    let mut idx = 0;
    while let Some(line) = lines.get(idx) {
        let trimmed = line.trim();
        let Some(condition) = conditions.iter().find(|cond| cond.directive == trimmed) else {
            kept.push(*line);
            idx += 1;
            continue;
        };
        let block = split_block(lines, idx + 1).ok_or_else(|| {
            TemplategenError::extraction(artifact, format!("`#endif` closing `{trimmed}`"))
        })?;
        let branch = if condition.holds {
            block.then_branch
        } else {
            block.else_branch
        };
        emit(artifact, branch, conditions, kept)?;
        idx = block.next;
    }
    Ok(())
}

struct Block<'a, 't> {
    then_branch: &'a [&'t str],
    else_branch: &'a [&'t str],
    next: usize,
}

/// Splits the block whose body starts at `start` into its branches.
fn split_block<'a, 't>(lines: &'a [&'t str], start: usize) -> Option<Block<'a, 't>> {
    let body = lines.get(start..)?;
    let mut depth = 0_usize;
    let mut else_at = None;
    for (offset, line) in body.iter().enumerate() {
        let directive = line.trim_start();
        if directive.starts_with("#if") {
            depth += 1;
        } else if directive.starts_with("#endif") {
            if depth == 0 {
                let then_end = else_at.unwrap_or(offset);
                let else_start = else_at.map_or(offset, |at| at + 1);
                return Some(Block {
                    then_branch: body.get(..then_end)?,
                    else_branch: body.get(else_start..offset)?,
                    next: start + offset + 1,
                });
            }
            depth -= 1;
        } else if depth == 0 && directive.starts_with("#else") {
            else_at = Some(offset);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TEXT: &str = "a\n#if RV32_HAS(EXT_F)\nf;\n#endif\n#if !RV32_HAS(JIT)\nmap;\n#else\ncache;\n#endif\nz\n";

    #[rstest]
    #[case(true, "a\nf;\ncache;\nz\n")]
    #[case(false, "a\ncache;\nz\n")]
    fn keeps_the_branch_that_applies(#[case] float: bool, #[case] expected: &str) {
        let conditions = [
            Condition::new("#if RV32_HAS(EXT_F)", float),
            Condition::new("#if !RV32_HAS(JIT)", false),
        ];
        assert_eq!(evaluate("riscv_private.h", TEXT, &conditions).expect("evaluate"), expected);
    }

    #[rstest]
    fn unknown_conditionals_pass_through() {
        let text = "#if RV32_HAS(SDL)\nsdl;\n#endif\n";
        assert_eq!(evaluate("riscv_private.h", text, &[]).expect("evaluate"), text);
    }

    #[rstest]
    fn nested_blocks_close_at_the_matching_endif() {
        let text = "#if RV32_HAS(GDBSTUB)\n#ifdef X\nx;\n#endif\ny;\n#endif\nz;";
        let conditions = [Condition::new("#if RV32_HAS(GDBSTUB)", false)];
        assert_eq!(evaluate("riscv_private.h", text, &conditions).expect("evaluate"), "z;");
    }

    #[rstest]
    fn unterminated_block_is_an_extraction_error() {
        let conditions = [Condition::new("#if RV32_HAS(GDBSTUB)", false)];
        let err = evaluate("riscv_private.h", "#if RV32_HAS(GDBSTUB)\nx;", &conditions)
            .expect_err("missing #endif");
        assert!(matches!(err, TemplategenError::Extraction { .. }));
    }
}
