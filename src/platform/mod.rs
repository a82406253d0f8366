// linemark storage paths
// Store root: ~/.linemark/<project>/store.json
// An explicit override path supplied by the host takes precedence (see
// `FileStore::for_project`).

use std::env;
use std::path::PathBuf;

/// Returns the user's home directory.
/// Uses `$HOME` (`%USERPROFILE%` on Windows), falling back to `/tmp`.
pub fn home_dir() -> PathBuf {
    #[cfg(windows)]
    let var = "USERPROFILE";
    #[cfg(not(windows))]
    let var = "HOME";

    env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Returns the fixed dotfolder all linemark stores live under.
pub fn store_root() -> PathBuf {
    home_dir().join(".linemark")
}

/// Returns the default store file for a project.
pub fn project_store_path(project: &str) -> PathBuf {
    store_root().join(project).join("store.json")
}
