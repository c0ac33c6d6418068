//! Source artifacts read by the generator.
//!
//! Artifacts are read whole through a `cap_std` directory capability rooted
//! at the configured source directory, then comment-stripped once so every
//! later stage matches anchors against code only.

pub mod comments;
pub mod lexical;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};

use crate::error::TemplategenError;

/// The part each input file plays in generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    /// I/O interface declarations (`memory_t`).
    Io,
    /// Public emulator declarations (registers, exceptions, I/O table, state).
    Riscv,
    /// Soft-float status enumeration, only read under `EXT_F`.
    SoftFloat,
    /// Internal CPU-state declarations.
    Private,
    /// The canonical operation table.
    Operations,
}

/// File names of the input artifacts, relative to the source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactNames {
    /// I/O interface header.
    pub io: String,
    /// Public emulator header.
    pub riscv: String,
    /// Soft-float header.
    pub softfloat: String,
    /// Internal CPU-state header.
    pub private: String,
    /// Canonical operation table.
    pub operations: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            io: "io.h".to_owned(),
            riscv: "riscv.h".to_owned(),
            softfloat: "softfloat.h".to_owned(),
            private: "riscv_private.h".to_owned(),
            operations: "rv32_template.c".to_owned(),
        }
    }
}

/// One input file, held as comment-free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    role: ArtifactRole,
    name: String,
    text: String,
}

impl SourceArtifact {
    /// Wraps raw file contents, stripping comments.
    pub fn new(role: ArtifactRole, name: impl Into<String>, raw: &str) -> Self {
        Self {
            role,
            name: name.into(),
            text: comments::strip_comments(raw),
        }
    }

    /// The artifact's role.
    #[must_use]
    pub const fn role(&self) -> ArtifactRole {
        self.role
    }

    /// Display name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Comment-stripped contents.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Every artifact a run can read. Only the soft-float header is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    /// I/O interface header.
    pub io: SourceArtifact,
    /// Public emulator header.
    pub riscv: SourceArtifact,
    /// Soft-float header, when present.
    pub softfloat: Option<SourceArtifact>,
    /// Where the soft-float header was looked for.
    pub softfloat_path: Utf8PathBuf,
    /// Internal CPU-state header.
    pub private: SourceArtifact,
    /// Canonical operation table.
    pub operations: SourceArtifact,
}

/// Reads the artifacts named by `names` from `source_dir`.
///
/// # Errors
///
/// Returns [`TemplategenError::MissingArtifact`] when a required file does
/// not exist and [`TemplategenError::Io`] for any other read failure.
pub fn load(source_dir: &Utf8Path, names: &ArtifactNames) -> Result<SourceSet, TemplategenError> {
    let dir = Dir::open_ambient_dir(source_dir, ambient_authority()).map_err(|err| {
        TemplategenError::Io {
            path: source_dir.to_path_buf(),
            source: err,
        }
    })?;
    let read_required = |role, name: &str| {
        read_optional(&dir, source_dir, name)?
            .map(|raw| SourceArtifact::new(role, name, &raw))
            .ok_or_else(|| TemplategenError::MissingArtifact(source_dir.join(name)))
    };

    let sources = SourceSet {
        io: read_required(ArtifactRole::Io, &names.io)?,
        riscv: read_required(ArtifactRole::Riscv, &names.riscv)?,
        softfloat: read_optional(&dir, source_dir, &names.softfloat)?
            .map(|raw| SourceArtifact::new(ArtifactRole::SoftFloat, names.softfloat.as_str(), &raw)),
        softfloat_path: source_dir.join(&names.softfloat),
        private: read_required(ArtifactRole::Private, &names.private)?,
        operations: read_required(ArtifactRole::Operations, &names.operations)?,
    };
    tracing::debug!(
        %source_dir,
        softfloat = sources.softfloat.is_some(),
        "loaded source artifacts"
    );
    Ok(sources)
}

fn read_optional(
    dir: &Dir,
    source_dir: &Utf8Path,
    name: &str,
) -> Result<Option<String>, TemplategenError> {
    match dir.read_to_string(name) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(TemplategenError::Io {
            path: Utf8PathBuf::from(source_dir).join(name),
            source: err,
        }),
    }
}
