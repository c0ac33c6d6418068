//! Filesystem helpers shared across `jit-templategen` modules.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::TemplategenError;

fn io_error(path: &Utf8Path, source: std::io::Error) -> TemplategenError {
    TemplategenError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Opens the directory holding `path` and returns it with the file name.
fn open_parent(path: &Utf8Path) -> Result<(Dir, &str), TemplategenError> {
    let name = path.file_name().ok_or_else(|| {
        io_error(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| io_error(parent, err))?;
    Ok((dir, name))
}

/// Reads a UTF-8 file, returning `None` when it (or its directory) does not
/// exist.
///
/// # Errors
///
/// Returns [`TemplategenError::Io`] for any other read failure.
pub fn read_optional_file(path: &Utf8Path) -> Result<Option<String>, TemplategenError> {
    let (dir, name) = match open_parent(path) {
        Ok(opened) => opened,
        Err(TemplategenError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    match dir.read_to_string(name) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_error(path, err)),
    }
}

/// Reads a UTF-8 file that must exist.
///
/// # Errors
///
/// Returns [`TemplategenError::Io`] when the file cannot be read.
pub fn read_file(path: &Utf8Path) -> Result<String, TemplategenError> {
    let (dir, name) = open_parent(path)?;
    dir.read_to_string(name).map_err(|err| io_error(path, err))
}
