//! Scenario state shared by the generation steps.

use jit_templategen::error::TemplategenError;
use jit_templategen::features::{DEFAULT_FLAG_PREFIX, UnknownFlagPolicy, resolve};
use jit_templategen::pipeline::{self, PlanEntry};
use jit_templategen::source::{ArtifactNames, SourceSet, load};
use jit_templategen::template::TemplateOutput;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use test_helpers::sample::{SampleDir, SampleTree, write_tree};

/// State carried between the steps of a generation scenario.
#[derive(Debug, Default, ScenarioState)]
pub struct GenerationState {
    /// Source files the scenario runs against.
    pub tree: Slot<SampleTree>,
    /// Output of the most recent successful run.
    pub output: Slot<TemplateOutput>,
    /// Rendered documents, in run order.
    pub renders: Slot<Vec<String>>,
    /// Diagnostic of the most recent failed run.
    pub failure: Slot<String>,
    /// Plan computed by the most recent planning run.
    pub plan: Slot<Vec<PlanEntry>>,
}

/// Provides an empty generation state.
#[fixture]
pub fn generation_state() -> GenerationState {
    GenerationState::default()
}

/// A sample tree written to disk with its sources loaded.
pub struct LoadedTree {
    _dir: SampleDir,
    /// Loaded artifacts.
    pub sources: SourceSet,
}

/// Writes `tree` to a temporary directory and loads it back.
pub fn load_tree(tree: &SampleTree) -> anyhow::Result<LoadedTree> {
    let dir = write_tree(tree)?;
    let sources = load(dir.path(), &ArtifactNames::default())?;
    Ok(LoadedTree { _dir: dir, sources })
}

/// Runs the generation stages over `tree` with whitespace-separated `flags`.
pub fn run_generation(tree: &SampleTree, flags: &str) -> anyhow::Result<Result<TemplateOutput, TemplategenError>> {
    let loaded = load_tree(tree)?;
    let tokens: Vec<&str> = flags.split_whitespace().collect();
    let exclusions = resolve(&tokens, DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Deny)?;
    Ok(pipeline::generate(&loaded.sources, &exclusions))
}

/// Computes the plan for `tree` with whitespace-separated `flags`.
pub fn run_plan(tree: &SampleTree, flags: &str) -> anyhow::Result<Vec<PlanEntry>> {
    let loaded = load_tree(tree)?;
    let tokens: Vec<&str> = flags.split_whitespace().collect();
    let exclusions = resolve(&tokens, DEFAULT_FLAG_PREFIX, UnknownFlagPolicy::Deny)?;
    Ok(pipeline::plan(&loaded.sources, &exclusions)?)
}
