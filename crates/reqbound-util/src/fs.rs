use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            tracing::debug!("found {} in {}", filename, current.display());
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Resolve `target` relative to the directory containing `file`.
///
/// Absolute targets are returned unchanged.
pub fn resolve_sibling(file: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        return target.to_path_buf();
    }
    match file.parent() {
        Some(dir) => dir.join(target),
        None => target.to_path_buf(),
    }
}
