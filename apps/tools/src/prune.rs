use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};

/// Deletes the immediate subdirectories of `root` whose names are not in
/// `keep`. Files are left alone. Returns the affected directories sorted by
/// path; with `dry_run` nothing is deleted.
pub(crate) fn prune_dirs(root: &Path, keep: &[String], dry_run: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut doomed = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if keep.iter().any(|kept| name.to_str() == Some(kept.as_str())) {
            continue;
        }
        doomed.push(entry.path());
    }
    doomed.sort();

    if !dry_run {
        for dir in &doomed {
            fs::remove_dir_all(dir)?;
        }
    }
    Ok(doomed)
}
