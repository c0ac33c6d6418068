//! CSV tables from `perf stat` logs.
//!
//! Each benchmark run under each emulation mode leaves a log at
//! `<dir>/<test>.prof.<mode>`. Counter values sit before their event label
//! on fixed lines of the `perf stat` report; the elapsed time sits before
//! `+-` on the summary line.

use camino::Utf8Path;

use super::malformed;
use crate::error::TemplategenError;
use crate::fs_helpers::read_file;

/// Emulation modes tabulated when none are given.
pub const DEFAULT_MODES: [&str; 6] = ["t1", "rvt1", "rvt2", "rvtiered", "tiered", "long_rvtiered"];

/// Benchmarks tabulated when none are given.
pub const DEFAULT_TESTS: [&str; 13] = [
    "dhrystone",
    "qsort",
    "miniz",
    "primes",
    "sha",
    "numeric_sort",
    "FP_emulation",
    "bitfield",
    "stream",
    "string_sort",
    "assignment",
    "idea",
    "huffman",
];

const ICACHE_LINE: usize = 5;
const ITLB_LINE: usize = 6;
const PAGE_FAULT_LINE: usize = 7;
const ELAPSED_LINE: usize = 9;

/// Counters read from one log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfSample {
    /// Headline number from the summary line.
    pub performance: String,
    /// `L1-icache-misses`, thousands separators removed.
    pub icache_misses: String,
    /// `iTLB-misses`, thousands separators removed.
    pub itlb_misses: String,
    /// `page-faults`, thousands separators removed.
    pub page_faults: String,
}

/// Parses one `perf stat` log.
///
/// # Errors
///
/// Returns [`TemplategenError::MalformedProfile`] when the log is too short
/// or a line lacks its label.
pub fn parse_perf_log(source_name: &str, text: &str) -> Result<PerfSample, TemplategenError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let line = |idx: usize| {
        lines.get(idx).copied().ok_or_else(|| {
            malformed(
                source_name,
                format!("expected at least {} lines, found {}", idx + 1, lines.len()),
            )
        })
    };
    let before = |idx: usize, label: &str| -> Result<String, TemplategenError> {
        let text_line = line(idx)?;
        let value = text_line
            .find(label)
            .and_then(|at| text_line.get(..at))
            .ok_or_else(|| malformed(source_name, format!("line {} lacks `{label}`", idx + 1)))?;
        Ok(value.replace(',', "").trim().to_owned())
    };

    Ok(PerfSample {
        icache_misses: before(ICACHE_LINE, "L1-icache-misses")?,
        itlb_misses: before(ITLB_LINE, "iTLB-misses")?,
        page_faults: before(PAGE_FAULT_LINE, "page-faults")?,
        performance: {
            let summary = line(ELAPSED_LINE)?;
            summary
                .find("+-")
                .and_then(|at| summary.get(..at))
                .map(|value| value.trim().to_owned())
                .ok_or_else(|| malformed(source_name, format!("line {} lacks `+-`", ELAPSED_LINE + 1)))?
        },
    })
}

/// Builds the CSV table for every mode and test, reading logs from `dir`.
///
/// # Errors
///
/// Returns [`TemplategenError::Io`] for unreadable logs and
/// [`TemplategenError::MalformedProfile`] for malformed ones.
pub fn perf_table<M, T>(dir: &Utf8Path, modes: &[M], tests: &[T]) -> Result<String, TemplategenError>
where
    M: AsRef<str>,
    T: AsRef<str>,
{
    let mut csv = String::new();
    for mode in modes.iter().map(AsRef::as_ref) {
        csv.push_str(&format!("Metric,{mode},L1-icache-misses,iTLB-misses,page-faults\n"));
        for test in tests.iter().map(AsRef::as_ref) {
            let path = dir.join(format!("{test}.prof.{mode}"));
            let sample = parse_perf_log(path.as_str(), &read_file(&path)?)?;
            csv.push_str(&format!(
                "{test},{},{},{},{}\n",
                sample.performance, sample.icache_misses, sample.itlb_misses, sample.page_faults
            ));
        }
    }
    Ok(csv)
}
