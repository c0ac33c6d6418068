//! Freshness checks for a committed template.

use camino::Utf8Path;
use sha2::{Digest, Sha256};

use crate::error::TemplategenError;
use crate::fs_helpers::read_optional_file;

/// Hex-encoded SHA-256 of `text`.
#[must_use]
pub fn digest(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Compares the template at `path` with a freshly rendered one.
///
/// # Errors
///
/// Returns [`TemplategenError::StaleTemplate`] when the file is missing or
/// its digest differs, and [`TemplategenError::Io`] when it cannot be read.
pub fn check_fresh(path: &Utf8Path, rendered: &str) -> Result<(), TemplategenError> {
    let expected = digest(rendered);
    let Some(existing) = read_optional_file(path)? else {
        tracing::info!(%path, "template missing");
        return Err(TemplategenError::StaleTemplate(path.to_path_buf()));
    };
    let found = digest(&existing);
    if found != expected {
        tracing::info!(%path, %expected, %found, "template digest differs");
        return Err(TemplategenError::StaleTemplate(path.to_path_buf()));
    }
    tracing::debug!(%path, digest = %found, "template is fresh");
    Ok(())
}
