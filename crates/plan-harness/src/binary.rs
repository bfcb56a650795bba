// crates/plan-harness/src/binary.rs
// ============================================================================
// Module: Binary Resolution
// Description: Locates the Terraform binary before a suite runs.
// Purpose: Let suites skip cleanly when the tool is not installed.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A missing binary is a skip condition, not an error, so resolution returns
//! `Option` rather than `Result`.

use std::env;
use std::path::Path;
use std::path::PathBuf;

/// Resolves a binary name against `PATH`, or checks it directly when it
/// already contains a path separator.
#[must_use]
pub fn find_binary(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let direct = Path::new(name);
    if direct.components().count() > 1 || direct.is_absolute() {
        return is_executable(direct).then(|| direct.to_path_buf());
    }
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var).find_map(|dir| {
        candidate_names(name).into_iter().map(|file| dir.join(file)).find(|path| is_executable(path))
    })
}

/// Returns true when the binary resolves to an executable file.
#[must_use]
pub fn binary_available(name: &str) -> bool {
    find_binary(name).is_some()
}

/// File names to probe in each `PATH` entry.
fn candidate_names(name: &str) -> Vec<String> {
    if cfg!(windows) && Path::new(name).extension().is_none() {
        vec![format!("{name}.exe"), name.to_string()]
    } else {
        vec![name.to_string()]
    }
}

/// Whether `path` is a regular file with an execute bit set.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata().is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

/// Whether `path` is a regular file.
#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
