// Cache path utilities.
// Locates the storage directory and maps storage keys to file names.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/imgmeta on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "imgmeta").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Directory holding persisted storage items.
pub fn storage_dir() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("storage"))
}

/// Path of the file backing a storage key.
pub fn item_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_name(key)))
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            _ => c,
        })
        .collect()
}
