//! Step definitions for the generation scenarios.

use std::collections::BTreeSet;

use anyhow::{Context, Result, anyhow, ensure};
use jit_templategen::collect::collect_operations;
use jit_templategen::error::TemplategenError;
use jit_templategen::pipeline::Decision;
use jit_templategen::template::{TemplateOutput, render};
use jit_templategen::transform::{EmissionDirective, OperationGroup};
use rstest_bdd_macros::{given, then, when};
use test_helpers::sample::{SampleTree, operation_table, riscv_header};

use crate::fixtures::{GenerationState, load_tree, run_generation, run_plan};

const ADD_BODY: &str = "rv->X[ir->rd] = rv->X[ir->rs1] + rv->X[ir->rs2];";
const JAL_BODY: &str = "const uint32_t pc = PC;\n    PC += ir->imm;\n    rv->X[ir->rd] = pc + ir->insn_len;";

fn current_tree(state: &GenerationState) -> SampleTree {
    state.tree.get().unwrap_or_else(SampleTree::with_softfloat)
}

fn record_run(state: &GenerationState, outcome: Result<TemplateOutput, TemplategenError>) {
    match outcome {
        Ok(output) => {
            let mut renders = state.renders.take().unwrap_or_default();
            renders.push(render(&output));
            state.renders.set(renders);
            state.output.set(output);
        }
        Err(err) => state.failure.set(err.to_string()),
    }
}

fn group_named(state: &GenerationState, mnemonic: &str) -> Result<OperationGroup> {
    state
        .output
        .with_ref(|output| output.groups.iter().find(|group| group.mnemonic == mnemonic).cloned())
        .ok_or_else(|| anyhow!("no template was generated"))?
        .ok_or_else(|| anyhow!("group {mnemonic} is missing"))
}

fn mnemonics(output: &TemplateOutput) -> BTreeSet<String> {
    output.groups.iter().map(|group| group.mnemonic.clone()).collect()
}

#[given("the sample interpreter sources")]
fn sample_sources(generation_state: &GenerationState) {
    generation_state.tree.set(SampleTree::with_softfloat());
}

#[given("an operation table holding add and jal")]
fn add_and_jal(generation_state: &GenerationState) {
    generation_state.tree.set(SampleTree {
        operations: Some(operation_table(&[("add", ADD_BODY), ("jal", JAL_BODY)])),
        ..SampleTree::default()
    });
}

#[given("an operation table where add assigns rs1 to a scratch local")]
fn scratch_assignment(generation_state: &GenerationState) {
    generation_state.tree.set(SampleTree {
        operations: Some(operation_table(&[("add", "a = ir->rs1;")])),
        ..SampleTree::default()
    });
}

#[given("a register table listing {count} names")]
fn short_register_table(generation_state: &GenerationState, count: usize) {
    let tree = current_tree(generation_state);
    generation_state.tree.set(SampleTree {
        riscv: Some(riscv_header(count)),
        ..tree
    });
}

#[when("the template is generated without flags")]
fn generate_without_flags(generation_state: &GenerationState) -> Result<()> {
    let outcome = run_generation(&current_tree(generation_state), "")?;
    record_run(generation_state, outcome);
    Ok(())
}

#[when("the template is generated with flags {flags}")]
fn generate_with_flags(generation_state: &GenerationState, flags: String) -> Result<()> {
    let outcome = run_generation(&current_tree(generation_state), &flags)?;
    record_run(generation_state, outcome);
    Ok(())
}

#[when("the template is generated twice with flags {flags}")]
fn generate_twice(generation_state: &GenerationState, flags: String) -> Result<()> {
    for _ in 0..2 {
        let outcome = run_generation(&current_tree(generation_state), &flags)?;
        record_run(generation_state, outcome);
    }
    Ok(())
}

#[when("the plan is computed with flags {flags}")]
fn compute_plan(generation_state: &GenerationState, flags: String) -> Result<()> {
    let plan = run_plan(&current_tree(generation_state), &flags)?;
    generation_state.plan.set(plan);
    Ok(())
}

#[then("the template holds {count} operation groups")]
fn group_count(generation_state: &GenerationState, count: usize) -> Result<()> {
    let found = generation_state
        .output
        .with_ref(|output| output.groups.len())
        .ok_or_else(|| anyhow!("no template was generated"))?;
    ensure!(found == count, "expected {count} groups, found {found}");
    Ok(())
}

#[then("group {mnemonic} uses accessors {fields}")]
fn group_accessors(generation_state: &GenerationState, mnemonic: String, fields: String) -> Result<()> {
    let group = group_named(generation_state, &mnemonic)?;
    let used: Vec<&str> = group
        .directives
        .iter()
        .flat_map(|directive| match directive {
            EmissionDirective::Parameterized { args, .. } => args.clone(),
            EmissionDirective::Literal(_) => Vec::new(),
        })
        .map(|accessor| accessor.field())
        .collect();
    let expected: Vec<&str> = fields.split(',').map(str::trim).collect();
    ensure!(used == expected, "group {mnemonic} uses {used:?}, expected {expected:?}");
    Ok(())
}

#[then("group {mnemonic} emits a single directive with {count} placeholders")]
fn single_directive(generation_state: &GenerationState, mnemonic: String, count: usize) -> Result<()> {
    let group = group_named(generation_state, &mnemonic)?;
    let [EmissionDirective::Parameterized { format, args }] = group.directives.as_slice() else {
        return Err(anyhow!("group {mnemonic} has directives {:?}", group.directives));
    };
    ensure!(args.len() == count, "expected {count} arguments, found {}", args.len());
    ensure!(
        format.matches("%u").count() == count,
        "format {format:?} does not hold {count} placeholders"
    );
    Ok(())
}

#[then("the entry point declares scratch local {name}")]
fn entry_declares(generation_state: &GenerationState, name: String) -> Result<()> {
    let declared = generation_state
        .output
        .with_ref(|output| {
            output.entry.iter().any(|line| {
                line.trim_end_matches(';')
                    .split([' ', ','])
                    .any(|word| word == name)
            })
        })
        .ok_or_else(|| anyhow!("no template was generated"))?;
    ensure!(declared, "entry point does not declare {name}");
    Ok(())
}

#[then("no group is named {mnemonic}")]
fn group_absent(generation_state: &GenerationState, mnemonic: String) -> Result<()> {
    ensure!(
        group_named(generation_state, &mnemonic).is_err(),
        "group {mnemonic} should not be emitted"
    );
    Ok(())
}

#[then("group {mnemonic} is present")]
fn group_present(generation_state: &GenerationState, mnemonic: String) -> Result<()> {
    group_named(generation_state, &mnemonic).map(drop)
}

#[then("every group of a run without flags is still present")]
fn superset_of_flagless(generation_state: &GenerationState) -> Result<()> {
    let flagless = run_generation(&current_tree(generation_state), "")??;
    let enabled = generation_state
        .output
        .with_ref(mnemonics)
        .ok_or_else(|| anyhow!("no template was generated"))?;
    let missing: Vec<_> = mnemonics(&flagless).difference(&enabled).cloned().collect();
    ensure!(missing.is_empty(), "enabling a flag dropped {missing:?}");
    Ok(())
}

#[then("generation fails with a malformed register table of {count} entries")]
fn register_table_failure(generation_state: &GenerationState, count: usize) -> Result<()> {
    ensure!(generation_state.output.is_empty(), "generation should not succeed");
    let message = generation_state
        .failure
        .get()
        .context("generation did not report a failure")?;
    ensure!(
        message.contains("malformed register table") && message.contains(&format!("found {count}")),
        "unexpected diagnostic: {message}"
    );
    Ok(())
}

#[then("both renders are identical")]
fn renders_identical(generation_state: &GenerationState) -> Result<()> {
    let renders = generation_state.renders.get().unwrap_or_default();
    let [first, second] = renders.as_slice() else {
        return Err(anyhow!("expected two renders, found {}", renders.len()));
    };
    ensure!(first == second, "renders differ");
    Ok(())
}

#[then("every collected operation is either emitted or skipped")]
fn plan_partitions_table(generation_state: &GenerationState) -> Result<()> {
    let loaded = load_tree(&current_tree(generation_state))?;
    let collected: Vec<String> = collect_operations(&loaded.sources.operations)?
        .into_iter()
        .map(|record| record.mnemonic)
        .collect();
    let planned: Vec<String> = generation_state
        .plan
        .get()
        .context("no plan was computed")?
        .into_iter()
        .map(|entry| entry.mnemonic)
        .collect();
    ensure!(planned == collected, "plan {planned:?} does not match table {collected:?}");
    Ok(())
}

fn decision_of(generation_state: &GenerationState, mnemonic: &str) -> Result<Decision> {
    generation_state
        .plan
        .with_ref(|plan| {
            plan.iter()
                .find(|entry| entry.mnemonic == mnemonic)
                .map(|entry| entry.decision)
        })
        .ok_or_else(|| anyhow!("no plan was computed"))?
        .ok_or_else(|| anyhow!("operation {mnemonic} is not in the plan"))
}

#[then("operation {mnemonic} is skipped")]
fn operation_skipped(generation_state: &GenerationState, mnemonic: String) -> Result<()> {
    let decision = decision_of(generation_state, &mnemonic)?;
    ensure!(matches!(decision, Decision::Skip(_)), "{mnemonic} is {decision}");
    Ok(())
}

#[then("operation {mnemonic} is emitted")]
fn operation_emitted(generation_state: &GenerationState, mnemonic: String) -> Result<()> {
    let decision = decision_of(generation_state, &mnemonic)?;
    ensure!(decision == Decision::Emit, "{mnemonic} is {decision}");
    Ok(())
}
