//! Calculation-type attribution by required input files

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;

use log::{debug, error, warn};

use crate::config::CalcType;

/// Decide which calculation code `dir` belongs to.
///
/// A type matches when every one of its required input files is present
/// among the directory's immediate entries. Exactly one match attributes
/// the type. Zero or several matches exclude the directory with a
/// diagnostic: a directory holding a mix of codes' artifacts must never be
/// guessed at.
pub fn classify(
    dir: &Path,
    input_files: &BTreeMap<CalcType, Vec<String>>,
) -> io::Result<Option<CalcType>> {
    let mut contained: BTreeSet<OsString> = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        contained.insert(entry?.file_name());
    }

    let matches: Vec<CalcType> = input_files
        .iter()
        .filter(|(_, required)| {
            required
                .iter()
                .all(|name| contained.contains(OsStr::new(name)))
        })
        .map(|(calc_type, _)| *calc_type)
        .collect();

    match matches.as_slice() {
        [calc_type] => {
            debug!("{} identified as {calc_type}", dir.display());
            Ok(Some(*calc_type))
        }
        [] => {
            warn!("No matching input files found in {}", dir.display());
            Ok(None)
        }
        _ => {
            error!(
                "More than one type of calculation found in {}",
                dir.display()
            );
            Ok(None)
        }
    }
}
