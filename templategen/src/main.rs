//! CLI entrypoint for `jit-templategen`.

mod cli;

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jit_templategen::check::check_fresh;
use jit_templategen::config::{GeneratorConfig, load_config};
use jit_templategen::error::TemplategenError;
use jit_templategen::features::{ExclusionSet, resolve};
use jit_templategen::fs_helpers::read_file;
use jit_templategen::pipeline;
use jit_templategen::profile::{graph, hotspot, perf};
use jit_templategen::source::{self, SourceSet};

use crate::cli::{Args, Command, GenerateArgs, ProfileCommand, SourceArgs};

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() -> Result<(), TemplategenError> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    // Every stage finishes before the single write below.
    let Some(output) = run(&args)? else {
        return Ok(());
    };
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|source| TemplategenError::Io {
            path: Utf8PathBuf::from("<stdout>"),
            source,
        })
}

fn init_tracing(log_level: Option<&str>) {
    let filter = log_level
        .map(EnvFilter::try_new)
        .and_then(Result::ok)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<Option<String>, TemplategenError> {
    match &args.command {
        Command::Generate(generate) => run_generate(args, generate),
        Command::Plan(source_args) => {
            let (sources, exclusions) = prepare(args, source_args)?;
            let entries = pipeline::plan(&sources, &exclusions)?;
            Ok(Some(pipeline::format_plan(&entries)))
        }
        Command::Profile(profile) => run_profile(profile).map(Some),
    }
}

fn run_generate(args: &Args, generate: &GenerateArgs) -> Result<Option<String>, TemplategenError> {
    let (sources, exclusions) = prepare(args, &generate.source)?;
    let rendered = pipeline::generate_rendered(&sources, &exclusions)?;
    match &generate.check {
        Some(path) => check_fresh(path, &rendered).map(|()| None),
        None => Ok(Some(rendered)),
    }
}

fn prepare(args: &Args, source_args: &SourceArgs) -> Result<(SourceSet, ExclusionSet), TemplategenError> {
    let config: GeneratorConfig = load_config(source_args.config_options(args.config.as_deref()))?;
    let exclusions = resolve(&source_args.flags, &config.flag_prefix, config.unknown_flags)?;
    tracing::debug!(
        excluded = exclusions.len(),
        enabled = ?exclusions.enabled_extensions(),
        "resolved feature flags"
    );
    let sources = source::load(&config.source_dir, &config.artifacts)?;
    Ok((sources, exclusions))
}

fn run_profile(command: &ProfileCommand) -> Result<String, TemplategenError> {
    match command {
        ProfileCommand::Graph { file } => {
            let records = graph::parse_records(file.as_str(), &read_file(file)?)?;
            Ok(graph::render_dot(&records))
        }
        ProfileCommand::Perf { dir, modes, tests } => match (modes.is_empty(), tests.is_empty()) {
            (true, true) => perf::perf_table(dir, &perf::DEFAULT_MODES, &perf::DEFAULT_TESTS),
            (true, false) => perf::perf_table(dir, &perf::DEFAULT_MODES, tests),
            (false, true) => perf::perf_table(dir, modes, &perf::DEFAULT_TESTS),
            (false, false) => perf::perf_table(dir, modes, tests),
        },
        ProfileCommand::Hotspots {
            detailed,
            abbreviated,
        } => {
            let chained = hotspot::parse_detailed(detailed.as_str(), &read_file(detailed)?)?;
            let unchained = hotspot::parse_abbreviated(abbreviated.as_str(), &read_file(abbreviated)?)?;
            Ok(hotspot::merge_report(chained, unchained))
        }
    }
}
