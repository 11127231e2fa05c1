//! Quick line-presence check over discovered output files

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::files;
use crate::search;

/// Find every file named `filename` under `directory`, fail the ones with
/// no line containing `require_text`, and write the failures to
/// `report_path`.
///
/// Nothing is written when every file has the line. A file that cannot be
/// read is warned about and excluded from the failure list; unreadable is
/// an error, not a failed job.
pub fn run(
    directory: &Path,
    filename: &str,
    require_text: &str,
    report_path: &Path,
) -> Result<()> {
    let fnames = search::find_marker_files(directory, filename)?;
    info!("Found a total of {} files matching {filename}", fnames.len());

    let mut failed: Vec<PathBuf> = Vec::new();
    for path in fnames {
        match files::file_contains_line(&path, require_text) {
            Ok(true) => {}
            Ok(false) => failed.push(path),
            Err(err) => warn!("Could not read {}: {err}", path.display()),
        }
    }

    if failed.is_empty() {
        info!("No jobs failed, no report to write");
        return Ok(());
    }

    info!("Failed jobs: {}", failed.len());
    let mut file = File::create(report_path)
        .with_context(|| format!("creating report file {}", report_path.display()))?;
    writeln!(file, "# Failed jobs")?;
    for path in &failed {
        writeln!(file, "{}", path.display())?;
    }
    Ok(())
}
