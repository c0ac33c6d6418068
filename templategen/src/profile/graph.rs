//! Block graph rendering from profile dumps.
//!
//! A dump starts with a header line followed by one record per translated
//! block:
//!
//! ```text
//! PC_start|PC_end|frequency|hot|backward|loop|untaken|taken|IR_list
//! 0x10074|0x10080|12|2|0|1|NULL|0x10074|addi,bne
//! ```

use std::collections::HashMap;

use super::malformed;
use crate::error::TemplategenError;

const NO_TARGET: &str = "NULL";

/// How far a block has been promoted through the execution tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Interpreted only.
    Cold,
    /// Compiled by the baseline JIT.
    Warm,
    /// Compiled by the optimising tier.
    Hot,
    /// A tier number this tool does not know.
    Other(u32),
}

impl Tier {
    const fn from_number(number: u32) -> Self {
        match number {
            0 => Self::Cold,
            1 => Self::Warm,
            2 => Self::Hot,
            other => Self::Other(other),
        }
    }

    /// Graphviz fill colour, or `None` to leave the node unfilled.
    #[must_use]
    pub const fn fill_color(self) -> Option<&'static str> {
        match self {
            Self::Cold => Some("white"),
            Self::Warm => Some("blue"),
            Self::Hot => Some("red"),
            Self::Other(_) => None,
        }
    }
}

/// The parts of a profile record the block graph needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Start address as written.
    pub start: String,
    /// Execution tier.
    pub tier: Tier,
    /// Fall-through successor.
    pub untaken: Option<String>,
    /// Branch-taken successor.
    pub taken: Option<String>,
}

/// Parses a profile dump.
///
/// The first line is a header. Lines without exactly nine fields are
/// skipped. A later record with the same start address replaces the earlier
/// one but keeps its position.
///
/// # Errors
///
/// Returns [`TemplategenError::MalformedProfile`] when a start address is not
/// hexadecimal or a tier is not a number.
pub fn parse_records(source_name: &str, text: &str) -> Result<Vec<ProfileRecord>, TemplategenError> {
    let mut records: Vec<ProfileRecord> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();

    for line in text.split('\n').skip(1) {
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        // start|end|frequency|tier|backward|loop|untaken|taken|IR list
        let [start, _, _, tier, _, _, untaken, taken, _] = fields.as_slice() else {
            continue;
        };
        let key = parse_address(start)
            .ok_or_else(|| malformed(source_name, format!("start address `{start}` is not hexadecimal")))?;
        let tier_number: u32 = tier
            .parse()
            .map_err(|_| malformed(source_name, format!("tier `{tier}` is not a number")))?;

        let record = ProfileRecord {
            start: (*start).to_owned(),
            tier: Tier::from_number(tier_number),
            untaken: target(untaken),
            taken: target(taken),
        };
        match positions.get(&key).and_then(|&idx| records.get_mut(idx)) {
            Some(existing) => *existing = record,
            None => {
                positions.insert(key, records.len());
                records.push(record);
            }
        }
    }
    tracing::debug!(source = source_name, blocks = records.len(), "parsed profile records");
    Ok(records)
}

fn parse_address(text: &str) -> Option<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).ok()
}

fn target(field: &str) -> Option<String> {
    (field != NO_TARGET).then(|| field.to_owned())
}

/// Renders the block graph as Graphviz DOT.
///
/// Every node is declared first, then the edges of each block: taken target
/// before fall-through.
#[must_use]
pub fn render_dot(records: &[ProfileRecord]) -> String {
    let mut dot = String::from("// Profiling Graph\ndigraph {\n\tgraph [ratio=compress]\n");
    for record in records {
        let node = quote(&record.start);
        match record.tier.fill_color() {
            Some(color) => dot.push_str(&format!("\t{node} [label={node} fillcolor={color} style=filled]\n")),
            None => dot.push_str(&format!("\t{node} [label={node}]\n")),
        }
    }
    for record in records {
        for successor in [&record.taken, &record.untaken].into_iter().flatten() {
            dot.push_str(&format!("\t{} -> {}\n", quote(&record.start), quote(successor)));
        }
    }
    dot.push_str("}\n");
    dot
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('"', "\\\""))
}
