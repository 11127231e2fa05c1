//! Completion evaluation of one calculation directory

use std::fs;
use std::path::Path;

use log::debug;

use crate::config::CompletionCheck;
use crate::files;

/// How many lines at the end of an output file are inspected when a check
/// requires a marker substring.
const TAIL_LINE_LIMIT: usize = 100;

/// True when every completion check passes for `dir`.
///
/// Checks run in order and short-circuit on the first failure. A missing or
/// unreadable output file fails its check rather than erroring; incomplete
/// jobs routinely have produced no output at all. The caller must pass the
/// checks belonging to the directory's attributed calculation type.
pub fn job_status(dir: &Path, checks: &[CompletionCheck]) -> bool {
    for check in checks {
        let path = dir.join(&check.file);
        let passed = match &check.contains {
            None => fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false),
            Some(substring) => match files::tail_lines(&path, TAIL_LINE_LIMIT) {
                Ok(lines) => files::any_line_contains(&lines, substring),
                Err(_) => false,
            },
        };
        if !passed {
            debug!("{} failed its completion check", path.display());
            return false;
        }
    }
    true
}
