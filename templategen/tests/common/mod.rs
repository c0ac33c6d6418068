//! Shared helpers for `jit-templategen` integration tests.

use std::process::{Command, Output};

use camino::Utf8PathBuf;

/// Resolves the compiled `jit-templategen` binary path, preferring the
/// compile-time cargo variable and falling back to the runtime cargo and
/// nextest ones.
///
/// # Errors
///
/// Returns an error when none of the supported variables are present.
pub fn templategen_exe() -> anyhow::Result<Utf8PathBuf> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_jit-templategen") {
        return Ok(Utf8PathBuf::from(path));
    }
    let env_vars = [
        "CARGO_BIN_EXE_jit-templategen",
        "CARGO_BIN_EXE_jit_templategen",
        "NEXTEST_BIN_EXE_jit-templategen",
        "NEXTEST_BIN_EXE_jit_templategen",
    ];
    for var in env_vars {
        if let Ok(path) = std::env::var(var) {
            return Ok(Utf8PathBuf::from(path));
        }
    }
    Err(anyhow::anyhow!("jit-templategen binary path not found in environment"))
}

/// Runs the binary with `args` from `cwd`, without inherited configuration
/// or log settings.
///
/// # Errors
///
/// Returns an error when the binary cannot be located or spawned.
pub fn run_templategen(cwd: &camino::Utf8Path, args: &[&str]) -> anyhow::Result<Output> {
    let exe = templategen_exe()?;
    let output = Command::new(exe.as_str())
        .current_dir(cwd.as_str())
        .env_remove("RUST_LOG")
        .env_remove("TEMPLATEGEN_SOURCE_DIR")
        .env_remove("TEMPLATEGEN_FLAG_PREFIX")
        .env_remove("TEMPLATEGEN_UNKNOWN_FLAGS")
        .env_remove("TEMPLATEGEN_CONFIG_PATH")
        .args(args)
        .output()?;
    Ok(output)
}
