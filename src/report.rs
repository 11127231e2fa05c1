//! The report pipeline: classify calculation directories and decide which
//! jobs finished

pub mod classify;
pub mod status;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{CalcType, Config};
use crate::search;

/// Success and failure lists for one calculation type. Paths keep the
/// discovery order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOutcome {
    pub success: Vec<PathBuf>,
    pub fail: Vec<PathBuf>,
}

/// The aggregated report, keyed by calculation type.
///
/// Serialises transparently, so the JSON document is the plain
/// type → {success, fail} mapping operators consume downstream.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(pub BTreeMap<CalcType, TypeOutcome>);

/// Discover every calculation directory under `root`, attribute each a
/// type, evaluate its completion checks, and aggregate the outcomes.
///
/// Directories that cannot be attributed exactly one type are excluded
/// with a diagnostic and do not appear in the report.
pub fn build_report(root: &Path, marker: &str, config: &Config) -> Result<Report> {
    info!(
        "Generating report at {} (searching for {marker})",
        root.display()
    );

    let directories = search::find_marker_dirs(root, marker)?;

    let mut report = Report::default();
    for dir in directories {
        let Some(calc_type) = classify::classify(&dir, &config.input_files)? else {
            continue;
        };
        let checks = match config.completion_checks.get(&calc_type) {
            Some(checks) => checks,
            None => {
                warn!(
                    "No completion checks configured for {calc_type}, skipping {}",
                    dir.display()
                );
                continue;
            }
        };
        let outcome = report.0.entry(calc_type).or_default();
        if status::job_status(&dir, checks) {
            outcome.success.push(dir);
        } else {
            outcome.fail.push(dir);
        }
    }

    for (calc_type, outcome) in &report.0 {
        let total = outcome.success.len() + outcome.fail.len();
        if outcome.fail.is_empty() {
            info!("{calc_type}: all {total} complete");
        } else {
            warn!("{calc_type} incomplete: {}/{total}", outcome.success.len());
        }
    }

    Ok(report)
}
