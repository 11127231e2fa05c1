//! Recursive discovery of calculation directories by marker file

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("search root {0} does not exist or is not a directory")]
    RootNotFound(PathBuf),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

/// Find every file named exactly `filename` anywhere under `root`.
///
/// Results are sorted lexicographically by path string so runs are
/// reproducible no matter how the filesystem orders its entries. An
/// unreadable entry below the root is skipped with a warning; an
/// unreadable root is fatal.
pub fn find_marker_files(root: &Path, filename: &str) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        return Err(Error::RootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if err.path() == Some(root) {
                    return Err(err.into());
                }
                warn!("Skipping unreadable path during search: {err}");
                continue;
            }
        };
        if !entry.file_type().is_dir() && entry.file_name() == filename {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}

/// Find every directory under `root` containing a file named `filename`.
///
/// This is the unit of work for both pipelines: each returned directory
/// holds one calculation. Parents are deduplicated and sorted the same way
/// as [`find_marker_files`].
pub fn find_marker_dirs(root: &Path, filename: &str) -> Result<Vec<PathBuf>, Error> {
    let mut dirs: Vec<PathBuf> = find_marker_files(root, filename)?
        .iter()
        .filter_map(|file| file.parent().map(Path::to_path_buf))
        .collect();
    dirs.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    dirs.dedup();
    debug!("{} directories contain {filename}", dirs.len());
    Ok(dirs)
}
