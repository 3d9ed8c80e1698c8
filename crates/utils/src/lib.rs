// utils crate

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod text;

pub fn is_workflow_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("xaml"))
        .unwrap_or(false)
}

/// Recursively collect workflow documents under `dir`, sorted by path so
/// batch output is stable between runs.
pub fn find_workflow_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_workflow_file(path))
        .collect();

    files.sort();
    files
}
