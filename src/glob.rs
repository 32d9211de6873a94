//! Filesystem glob expansion
//!
//! Thin collaborator interface over the `glob` crate: expand a pattern
//! relative to a base directory and hand every matching regular file to a
//! callback. The callback can stop the walk early by returning
//! [`ControlFlow::Break`].

use crate::error::Result;
use std::ops::ControlFlow;

/// Invoke `callback` once per file matching `pattern` under `base_dir`
///
/// The callback receives the matched path joined with `base_dir`, exactly
/// as it would be opened. Directories are skipped. Matches arrive in the
/// alphabetical order the `glob` crate yields.
pub fn for_each_match<F>(pattern: &str, base_dir: &str, mut callback: F) -> Result<()>
where
    F: FnMut(&str) -> Result<ControlFlow<()>>,
{
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

    let full_pattern = if base_dir.is_empty() {
        pattern.to_string()
    } else if base_dir.ends_with('/') {
        format!("{}{}", base_dir, pattern)
    } else {
        format!("{}/{}", base_dir, pattern)
    };

    for entry in glob::glob(&full_pattern)? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        if callback(&path.to_string_lossy())?.is_break() {
            break;
        }
    }

    Ok(())
}
