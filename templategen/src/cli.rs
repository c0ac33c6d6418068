//! Command-line interface definitions for `jit-templategen`.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args as ClapArgs, Parser, Subcommand};

/// Parsed CLI arguments for `jit-templategen`.
#[derive(Debug, Parser)]
#[command(name = "jit-templategen")]
#[command(about = "Generate the tier-2 JIT instruction template from interpreter sources")]
#[command(version)]
pub struct Args {
    /// Configuration file to use instead of `templategen.toml`.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<Utf8PathBuf>,
    /// Log filter directive, e.g. `debug` or `jit_templategen=info`.
    #[arg(long, global = true, value_name = "filter")]
    pub log_level: Option<String>,
    /// Action to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the template to standard output.
    Generate(GenerateArgs),
    /// List every operation with whether it is templated.
    Plan(SourceArgs),
    /// Inspect profiling output.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

/// Options shared by commands that read the interpreter sources.
#[derive(Debug, Clone, ClapArgs)]
pub struct SourceArgs {
    /// Directory holding the interpreter sources.
    #[arg(long, value_name = "path")]
    pub source_dir: Option<Utf8PathBuf>,
    /// Prefix of feature flag tokens.
    #[arg(long, value_name = "prefix")]
    pub flag_prefix: Option<String>,
    /// Reject flags naming unregistered extensions.
    #[arg(long = "strict-flags")]
    pub is_strict: bool,
    /// Feature flags such as `RV32_FEATURE_EXT_M=1`, applied in order.
    #[arg(value_name = "FLAG")]
    pub flags: Vec<String>,
}

impl SourceArgs {
    /// Configuration options given on the command line, in the long form
    /// accepted by [`jit_templategen::config::load_config`].
    #[must_use]
    pub fn config_options(&self, config: Option<&Utf8Path>) -> Vec<String> {
        let mut options = Vec::new();
        if let Some(path) = config {
            options.push(format!("--config={path}"));
        }
        if let Some(dir) = &self.source_dir {
            options.push(format!("--source-dir={dir}"));
        }
        if let Some(prefix) = &self.flag_prefix {
            options.push(format!("--flag-prefix={prefix}"));
        }
        if self.is_strict {
            options.push("--unknown-flags=deny".to_owned());
        }
        options
    }
}

/// Options for `generate`.
#[derive(Debug, Clone, ClapArgs)]
pub struct GenerateArgs {
    /// Source and flag options.
    #[command(flatten)]
    pub source: SourceArgs,
    /// Compare with an existing template instead of printing.
    #[arg(long, value_name = "path")]
    pub check: Option<Utf8PathBuf>,
}

/// Profiling helpers.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Render a block profile dump as Graphviz DOT.
    Graph {
        /// Profile dump to read.
        file: Utf8PathBuf,
    },
    /// Tabulate `perf stat` logs as CSV.
    Perf {
        /// Directory holding `<test>.prof.<mode>` logs.
        #[arg(long, value_name = "path")]
        dir: Utf8PathBuf,
        /// Emulation mode (repeat for several).
        #[arg(long = "mode", value_name = "mode")]
        modes: Vec<String>,
        /// Benchmark (repeat for several).
        #[arg(long = "test", value_name = "test")]
        tests: Vec<String>,
    },
    /// Merge chained and unchained hotspot traces.
    Hotspots {
        /// Trace recorded with block chaining.
        detailed: Utf8PathBuf,
        /// Trace recorded without block chaining.
        abbreviated: Utf8PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[rstest]
    fn definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[rstest]
    fn generate_collects_trailing_flags() {
        let args = Args::try_parse_from([
            "jit-templategen",
            "generate",
            "--source-dir",
            "emu/src",
            "--strict-flags",
            "RV32_FEATURE_EXT_M=1",
            "RV32_FEATURE_EXT_C=0",
        ])
        .expect("parse");
        let Command::Generate(generate) = &args.command else {
            panic!("expected generate");
        };
        assert_eq!(generate.source.flags, ["RV32_FEATURE_EXT_M=1", "RV32_FEATURE_EXT_C=0"]);
        assert_eq!(
            generate.source.config_options(args.config.as_deref()),
            ["--source-dir=emu/src", "--unknown-flags=deny"]
        );
        assert!(generate.check.is_none());
    }

    #[rstest]
    fn global_options_follow_the_subcommand() {
        let args = Args::try_parse_from([
            "jit-templategen",
            "plan",
            "--log-level",
            "debug",
            "--config",
            "ci.toml",
        ])
        .expect("parse");
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        let Command::Plan(source) = &args.command else {
            panic!("expected plan");
        };
        assert_eq!(source.config_options(args.config.as_deref()), ["--config=ci.toml"]);
    }

    #[rstest]
    fn config_options_are_accepted_by_the_loader() {
        let args = Args::try_parse_from(["jit-templategen", "plan", "--flag-prefix", "CFG_"]).expect("parse");
        let Command::Plan(source) = &args.command else {
            panic!("expected plan");
        };
        ortho_config::figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config = jit_templategen::config::load_config(source.config_options(None)).expect("load");
            assert_eq!(config.flag_prefix, "CFG_");
            Ok(())
        });
    }

    #[rstest]
    fn perf_accepts_repeated_modes() {
        let args = Args::try_parse_from([
            "jit-templategen",
            "profile",
            "perf",
            "--dir",
            "perf",
            "--mode",
            "t1",
            "--mode",
            "rvt1",
        ])
        .expect("parse");
        let Command::Profile(ProfileCommand::Perf { modes, tests, .. }) = args.command else {
            panic!("expected profile perf");
        };
        assert_eq!(modes, ["t1", "rvt1"]);
        assert!(tests.is_empty());
    }
}
