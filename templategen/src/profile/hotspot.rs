//! Side-by-side hotspot report for chained and unchained runs.
//!
//! Both traces are streams of `PC =` records. The detailed trace (taken with
//! block chaining) records either
//!
//! ```text
//! PC = 0x10074
//! backward = 1
//! invoke time = 4096
//! ir_cnt = 12
//! loop = 1
//! entry = 0
//! frequency = 800
//! ```
//!
//! or only the `entry` and `frequency` lines. The abbreviated trace (no
//! chaining) records only `frequency`.

use super::{labelled_value, malformed};
use crate::error::TemplategenError;

const RECORD_MARKER: &str = "PC =";

/// Extra fields of a fully detailed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDetail {
    /// Whether the block ends in a backward jump.
    pub backward: String,
    /// Times the block was invoked.
    pub invoke_time: String,
    /// Instructions in the block.
    pub ir_cnt: String,
    /// Whether the block belongs to a loop.
    pub loop_flag: String,
}

/// One record from the detailed trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRecord {
    /// Block address.
    pub pc: String,
    /// Whether the block is a chain entry point.
    pub entry: String,
    /// Execution count.
    pub frequency: String,
    /// Present for the long record form.
    pub detail: Option<BlockDetail>,
}

/// One record from the abbreviated trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnchainedRecord {
    /// Block address.
    pub pc: String,
    /// Execution count.
    pub frequency: String,
}

/// Splits a trace into the lines of each `PC =` record, dropping anything
/// before the first one.
fn records(text: &str) -> impl Iterator<Item = Vec<&str>> {
    let body = text.find(RECORD_MARKER).and_then(|at| text.get(at..)).unwrap_or_default();
    body.split(RECORD_MARKER)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| chunk.lines().collect())
}

fn field<'t>(source_name: &str, lines: &[&'t str], idx: usize, label: &str) -> Result<&'t str, TemplategenError> {
    let line = lines
        .get(idx)
        .ok_or_else(|| malformed(source_name, format!("record is missing its `{label}` line")))?;
    labelled_value(source_name, line, label)
}

fn record_pc(lines: &[&str]) -> String {
    lines.first().map(|line| line.trim().to_owned()).unwrap_or_default()
}

/// Parses the detailed trace.
///
/// Records with more than three lines take the long form.
///
/// # Errors
///
/// Returns [`TemplategenError::MalformedProfile`] when a line lacks its
/// label.
pub fn parse_detailed(source_name: &str, text: &str) -> Result<Vec<ChainRecord>, TemplategenError> {
    records(text)
        .map(|lines| -> Result<ChainRecord, TemplategenError> {
            let pc = record_pc(&lines);
            if lines.len() > 3 {
                Ok(ChainRecord {
                    pc,
                    detail: Some(BlockDetail {
                        backward: field(source_name, &lines, 1, "backward = ")?.to_owned(),
                        invoke_time: field(source_name, &lines, 2, "invoke time = ")?.to_owned(),
                        ir_cnt: field(source_name, &lines, 3, "ir_cnt = ")?.to_owned(),
                        loop_flag: field(source_name, &lines, 4, "loop = ")?.to_owned(),
                    }),
                    entry: field(source_name, &lines, 5, "entry = ")?.to_owned(),
                    frequency: field(source_name, &lines, 6, "frequency = ")?.to_owned(),
                })
            } else {
                Ok(ChainRecord {
                    pc,
                    entry: field(source_name, &lines, 1, "entry = ")?.to_owned(),
                    frequency: field(source_name, &lines, 2, "frequency = ")?.to_owned(),
                    detail: None,
                })
            }
        })
        .collect()
}

/// Parses the abbreviated trace.
///
/// # Errors
///
/// Returns [`TemplategenError::MalformedProfile`] when a record lacks its
/// `frequency` line.
pub fn parse_abbreviated(source_name: &str, text: &str) -> Result<Vec<UnchainedRecord>, TemplategenError> {
    records(text)
        .map(|lines| -> Result<UnchainedRecord, TemplategenError> {
            Ok(UnchainedRecord {
                pc: record_pc(&lines),
                frequency: field(source_name, &lines, 1, "frequency = ")?.to_owned(),
            })
        })
        .collect()
}

fn both_row(unchained: &UnchainedRecord, chained: &ChainRecord) -> String {
    format!(
        "{:7}| {:14}| {:7}| {:10}| {:8}\n",
        unchained.pc, unchained.frequency, chained.pc, chained.frequency, chained.entry
    )
}

fn unchained_row(unchained: &UnchainedRecord) -> String {
    format!("{:7}| {:14}| {:7}| {:10}\n", unchained.pc, unchained.frequency, "", "")
}

fn chained_row(chained: &ChainRecord) -> String {
    format!(
        "{:7}| {:14}| {:7}| {:10}| {:8}\n",
        "", "", chained.pc, chained.frequency, chained.entry
    )
}

/// Merges both traces by address into the two-table report.
///
/// The first table has a row per address seen in either trace. The second
/// lists the addresses found in both traces whose chained record is fully
/// detailed.
#[must_use]
pub fn merge_report(mut chained: Vec<ChainRecord>, mut unchained: Vec<UnchainedRecord>) -> String {
    chained.sort_by(|left, right| left.pc.cmp(&right.pc));
    unchained.sort_by(|left, right| left.pc.cmp(&right.pc));

    let mut report = String::from("PC     | noc Frequency | PC     | Frequency | entry_point\n");
    let mut hotspots: Vec<(&UnchainedRecord, &ChainRecord, &BlockDetail)> = Vec::new();
    let mut noc = unchained.iter().peekable();
    let mut chain = chained.iter().peekable();

    loop {
        match (noc.peek(), chain.peek()) {
            (Some(&left), Some(&right)) if left.pc == right.pc => {
                report.push_str(&both_row(left, right));
                if let Some(detail) = &right.detail {
                    hotspots.push((left, right, detail));
                }
                noc.next();
                chain.next();
            }
            (Some(&left), Some(&right)) if left.pc > right.pc => {
                report.push_str(&chained_row(right));
                chain.next();
            }
            (Some(&left), _) => {
                report.push_str(&unchained_row(left));
                noc.next();
            }
            (None, Some(&right)) => {
                report.push_str(&chained_row(right));
                chain.next();
            }
            (None, None) => break,
        }
    }

    report.push_str(
        "PC     | noc Frequency | PC     | Frequency | backward | invoke time | ir_cnt | loop | entry\n",
    );
    for (left, right, detail) in hotspots {
        report.push_str(&format!(
            "{:7}| {:14}| {:7}| {:10}| {:9}| {:12}| {:6} | {:6} | {:6}\n",
            left.pc,
            left.frequency,
            right.pc,
            right.frequency,
            detail.backward,
            detail.invoke_time,
            detail.ir_cnt,
            detail.loop_flag,
            right.entry
        ));
    }
    report
}
