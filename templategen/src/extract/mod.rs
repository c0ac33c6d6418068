//! Structural extraction of the declarations the template prologue needs.
//!
//! Each declaration is pulled from a comment-stripped artifact by an
//! [`Anchor`]. A declaration either matches completely or the run aborts;
//! nothing is ever defaulted to empty text.

mod anchor;
pub mod conditional;
pub mod registers;

pub use anchor::Anchor;

use crate::error::TemplategenError;
use crate::features::{ExclusionSet, FLOAT_EXTENSION};
use crate::source::SourceSet;

use self::conditional::Condition;

/// Memory interface type from the I/O header.
pub const MEMORY_ANCHOR: Anchor = Anchor::new("typedef", "memory_t;");
/// Core type aliases through the exception code type.
pub const EXCEPTION_ANCHOR: Anchor = Anchor::new("typedef", "riscv_exception_t;");
/// Callback typedefs and the I/O table.
pub const IO_TABLE_ANCHOR: Anchor = Anchor::new("typedef riscv_word_t", "riscv_io_t;");
/// Emulator state structure; the leading member tells it apart from the I/O
/// table.
pub const STATE_ANCHOR: Anchor = Anchor::new("typedef struct {", "state_t;").followed_by("memory_t");
/// Soft-float exception flag enumeration.
pub const SOFTFLOAT_ANCHOR: Anchor = Anchor::new("enum", "};");
/// Internal CPU state, up to the last member the template touches.
pub const CPU_STATE_ANCHOR: Anchor = Anchor::new("struct riscv_internal", "bool compressed;");

/// Host-side file descriptor table, meaningless inside a compiled trace.
pub const PRUNED_STATE_MEMBER: &str = "map_t fd_map;";

/// Floating-point scalar types fixed by the template ABI.
pub const FLOAT_TYPES: &str = "typedef struct { uint32_t v; } float32_t;\ntypedef float32_t riscv_float_t;";

/// A named fragment of declaration text, one entry per source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Short name used in logs and tests.
    pub name: &'static str,
    /// The fragment's lines, in source order.
    pub lines: Vec<String>,
}

impl Declaration {
    /// Splits `text` into a declaration's lines.
    #[must_use]
    pub fn from_text(name: &'static str, text: &str) -> Self {
        Self {
            name,
            lines: text.lines().map(str::to_owned).collect(),
        }
    }
}

/// Conditionals in the private header whose outcome is known at generation
/// time.
#[must_use]
pub fn private_header_conditions(exclusions: &ExclusionSet) -> Vec<Condition> {
    vec![
        Condition::new("#if RV32_HAS(GDBSTUB)", false),
        Condition::new("#if !RV32_HAS(JIT)", false),
        Condition::new(
            format!("#if RV32_HAS({FLOAT_EXTENSION})"),
            exclusions.is_enabled(FLOAT_EXTENSION),
        ),
    ]
}

/// Extracts every prologue declaration, in output order.
///
/// # Errors
///
/// Propagates [`TemplategenError::Extraction`] and
/// [`TemplategenError::MalformedRegisterTable`]; returns
/// [`TemplategenError::MissingArtifact`] when `EXT_F` is enabled but the
/// soft-float header was not loaded.
pub fn extract_declarations(
    sources: &SourceSet,
    exclusions: &ExclusionSet,
) -> Result<Vec<Declaration>, TemplategenError> {
    let io = &sources.io;
    let riscv = &sources.riscv;
    let mut declarations = vec![
        Declaration::from_text("memory_t", MEMORY_ANCHOR.extract(io.name(), io.text())?),
        Declaration::from_text(
            "registers",
            &registers::register_enum(&registers::register_names(riscv.name(), riscv.text())?),
        ),
        Declaration::from_text(
            "riscv_exception_t",
            EXCEPTION_ANCHOR.extract(riscv.name(), riscv.text())?,
        ),
        Declaration::from_text("riscv_float_t", FLOAT_TYPES),
        Declaration::from_text("riscv_io_t", IO_TABLE_ANCHOR.extract(riscv.name(), riscv.text())?),
        Declaration::from_text(
            "state_t",
            &prune_member(STATE_ANCHOR.extract(riscv.name(), riscv.text())?, PRUNED_STATE_MEMBER),
        ),
    ];

    if exclusions.is_enabled(FLOAT_EXTENSION) {
        let softfloat = sources
            .softfloat
            .as_ref()
            .ok_or_else(|| TemplategenError::MissingArtifact(sources.softfloat_path.clone()))?;
        declarations.push(Declaration::from_text(
            "softfloat",
            SOFTFLOAT_ANCHOR.extract(softfloat.name(), softfloat.text())?,
        ));
    }

    let private = &sources.private;
    let evaluated = conditional::evaluate(
        private.name(),
        private.text(),
        &private_header_conditions(exclusions),
    )?;
    let cpu_state = CPU_STATE_ANCHOR.extract(private.name(), &evaluated)?;
    declarations.push(Declaration::from_text("riscv_internal", &format!("{cpu_state}\n}};")));

    tracing::debug!(count = declarations.len(), "extracted declarations");
    Ok(declarations)
}

/// Removes `member` from `text`, dropping its line when nothing else is on it.
fn prune_member(text: &str, member: &str) -> String {
    text.lines()
        .filter_map(|line| {
            if !line.contains(member) {
                return Some(line.to_owned());
            }
            let remaining = line.replacen(member, "", 1);
            (!remaining.trim().is_empty()).then_some(remaining)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
