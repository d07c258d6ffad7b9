//! Path normalization utilities
//!
//! Item paths inside a container always use '/' as separator, regardless of
//! how the producing format spells them.

use std::path::PathBuf;

/// Normalize a path specification to use '/' as separator
pub fn pathspec(expression: &str) -> String {
    expression.replace('\\', "/")
}

/// Join an optional root prefix onto an item path
///
/// An empty root leaves the path untouched. A path that is already absolute
/// replaces the root, mirroring POSIX join semantics.
pub fn join_path(root: &str, path: &str) -> String {
    if root.is_empty() || path.starts_with('/') {
        return path.to_string();
    }
    format!("{}/{}", root.trim_end_matches('/'), path)
}

/// Map an item path to a safe relative filesystem path for extraction
///
/// Absolute prefixes are stripped, `.` components dropped, and `..` resolved
/// without ever escaping the extraction root. Returns None when nothing
/// usable remains.
pub fn sanitize_output_path(path: &str) -> Option<PathBuf> {
    let mut parts: Vec<&str> = Vec::new();
    for comp in path.split('/') {
        match comp {
            "" | "." => continue,
            ".." => {
                parts.pop()?;
            }
            comp if comp.contains('\0') => return None,
            comp => parts.push(comp),
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().collect())
}
