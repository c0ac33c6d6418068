//! Error types for `jit-templategen`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use thiserror::Error;

/// Errors surfaced by the template generation pipeline and the profiling
/// helpers.
///
/// Every variant is fatal: the binary aborts before writing anything to
/// standard output.
#[derive(Debug, Error)]
pub enum TemplategenError {
    /// A required anchor or delimiter was not found in a source artifact.
    #[error("extraction failed in {artifact}: anchor {anchor} not found")]
    Extraction {
        /// Display name of the artifact being scanned.
        artifact: String,
        /// Description of the anchor that did not match.
        anchor: String,
    },

    /// The register-name table did not hold exactly 32 entries.
    #[error("malformed register table in {artifact}: expected 32 entries, found {found}")]
    MalformedRegisterTable {
        /// Display name of the artifact being scanned.
        artifact: String,
        /// Number of entries actually found.
        found: usize,
    },

    /// A feature flag named an extension that is not registered.
    #[error("unrecognized feature flag '{flag}' (extension '{extension}' is not registered)")]
    UnrecognizedFeatureFlag {
        /// The token as supplied.
        flag: String,
        /// The extension name parsed from the token.
        extension: String,
    },

    /// A feature flag token could not be parsed.
    #[error("malformed feature flag '{token}': {reason}")]
    MalformedFeatureFlag {
        /// The token as supplied.
        token: String,
        /// Why the token was rejected.
        reason: &'static str,
    },

    /// A source artifact required by the current configuration is absent.
    #[error("required source artifact {0} is missing")]
    MissingArtifact(Utf8PathBuf),

    /// `--check` found that the on-disk template differs from a fresh run.
    #[error("template at {0} is stale; regenerate it")]
    StaleTemplate(Utf8PathBuf),

    /// Profiling input did not match its expected layout.
    #[error("malformed profile data in {source_name}: {message}")]
    MalformedProfile {
        /// File or stream the data came from.
        source_name: String,
        /// What was wrong with it.
        message: String,
    },

    /// Configuration layers could not be found, merged or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] Arc<OrthoError>),

    /// Reading or writing a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl TemplategenError {
    /// Builds a [`TemplategenError::Extraction`] for `anchor` in `artifact`.
    pub fn extraction(artifact: &str, anchor: impl Into<String>) -> Self {
        Self::Extraction {
            artifact: artifact.to_owned(),
            anchor: anchor.into(),
        }
    }
}
