//! Path helpers for configured locations.

use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}`; returns the input unchanged on lookup failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Expand `path`, then join it onto `base` if it is still relative.
pub fn anchor(base: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(&path.to_string_lossy()));
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}
