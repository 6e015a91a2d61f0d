use crate::error::LinkError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files under `root` in sorted path order, skipping anything that matches one of
/// `exclude` (globs relative to `root`). Excluded directories are not descended into.
pub fn collect_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>, LinkError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in exclude {
        builder.add(Glob::new(pattern)?);
    }
    let exclude = builder.build()?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(root, entry.path(), &exclude));

    for entry in walker {
        let entry = entry?;
        // follows symlinks, like the files they point at
        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_excluded(root: &Path, path: &Path, exclude: &GlobSet) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    exclude.is_match(relative)
}
