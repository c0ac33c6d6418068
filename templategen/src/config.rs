//! Layered generator configuration.
//!
//! [`GeneratorConfig`] derives [`OrthoConfig`], which merges these layers.
//! Later layers take precedence:
//!
//! 1. Built-in defaults.
//! 2. The first configuration file found. The candidates are checked in this
//!    order: `--config`, `TEMPLATEGEN_CONFIG_PATH`, then `templategen.toml`
//!    in the working directory, the home directory or the XDG config
//!    directory. An explicit `--config` must exist. When none of the
//!    default candidates exists, the defaults are used.
//! 3. `TEMPLATEGEN_*` environment variables. `__` separates nested keys, so
//!    `TEMPLATEGEN_ARTIFACTS__IO` sets `artifacts.io`.
//! 4. Command-line options.

use std::ffi::{OsStr, OsString};

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::error::TemplategenError;
use crate::features::{DEFAULT_FLAG_PREFIX, UnknownFlagPolicy};
use crate::source::ArtifactNames;

/// Program name placed before the configuration arguments.
const PROGRAM: &str = "jit-templategen";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(
    prefix = "TEMPLATEGEN",
    discovery(
        app_name = "templategen",
        config_file_name = "templategen.toml",
        dotfile_name = "templategen.toml",
        project_file_name = "templategen.toml",
        config_cli_long = "config",
    )
)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory holding the interpreter sources.
    #[ortho_config(default = default_source_dir())]
    pub source_dir: Utf8PathBuf,
    /// Prefix of feature flag tokens.
    #[ortho_config(default = String::from(DEFAULT_FLAG_PREFIX))]
    pub flag_prefix: String,
    /// Treatment of flags naming unregistered extensions.
    #[ortho_config(default = UnknownFlagPolicy::Warn)]
    pub unknown_flags: UnknownFlagPolicy,
    /// Input file names. Set from files or the environment only.
    #[ortho_config(skip_cli)]
    pub artifacts: ArtifactNames,
}

fn default_source_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("src")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            flag_prefix: DEFAULT_FLAG_PREFIX.to_owned(),
            unknown_flags: UnknownFlagPolicy::default(),
            artifacts: ArtifactNames::default(),
        }
    }
}

/// Merges every configuration layer.
///
/// `options` are the configuration options in long form, without a
/// program name. Examples are `--config=path`, `--source-dir=path`,
/// `--flag-prefix=P_` and `--unknown-flags=deny`.
///
/// # Errors
///
/// Returns [`TemplategenError::Config`] in three cases: an explicit
/// `--config` file is missing, a layer cannot be parsed, or a layer holds
/// invalid values.
pub fn load_config<I, S>(options: I) -> Result<GeneratorConfig, TemplategenError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = std::iter::once(OsString::from(PROGRAM))
        .chain(options.into_iter().map(|option| option.as_ref().to_os_string()));
    let config = GeneratorConfig::load_from_iter(args)?;
    tracing::debug!(
        source_dir = %config.source_dir,
        flag_prefix = %config.flag_prefix,
        unknown_flags = ?config.unknown_flags,
        "resolved configuration"
    );
    Ok(config)
}
