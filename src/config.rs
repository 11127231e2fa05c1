//! Calculation types and the rule tables that drive the report pipeline
//!
//! The compiled-in defaults cover the code versions this tool is run
//! against in production (FEFF 9.9.1 and VASP 6.2.1). Operators can
//! replace both tables by pointing `--config` at a JSON document of the
//! same shape.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::files;

/// A supported calculation code.
///
/// Directories are attributed a type by matching input files, and the
/// report groups its outcome lists under these names. The set is closed on
/// purpose: an unrecognised type in a config file fails deserialisation
/// loudly instead of becoming a silently-ignored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CalcType {
    #[serde(rename = "FEFF")]
    Feff,
    #[serde(rename = "VASP")]
    Vasp,
}

impl fmt::Display for CalcType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CalcType::Feff => write!(f, "FEFF"),
            CalcType::Vasp => write!(f, "VASP"),
        }
    }
}

/// A single completion condition on one output file.
///
/// Without `contains`, the file must exist and be non-empty. With it, the
/// substring must occur somewhere in the last 100 lines of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionCheck {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

/// The rule tables: which input files identify each calculation type, and
/// which output-file conditions mark it complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input files that must *all* be present for a directory to be of a type
    pub input_files: BTreeMap<CalcType, Vec<String>>,
    /// Ordered completion checks per type; all must pass for success
    pub completion_checks: BTreeMap<CalcType, Vec<CompletionCheck>>,
}

impl Default for Config {
    fn default() -> Self {
        let mut input_files = BTreeMap::new();
        input_files.insert(CalcType::Feff, vec!["feff.inp".to_string()]);
        input_files.insert(
            CalcType::Vasp,
            vec![
                "INCAR".to_string(),
                "POSCAR".to_string(),
                "KPOINTS".to_string(),
                "POTCAR".to_string(),
            ],
        );

        let mut completion_checks = BTreeMap::new();
        completion_checks.insert(
            CalcType::Feff,
            vec![
                CompletionCheck {
                    file: "xmu.dat".to_string(),
                    contains: None,
                },
                CompletionCheck {
                    file: "feff.out".to_string(),
                    contains: Some("feff ends at".to_string()),
                },
            ],
        );
        completion_checks.insert(
            CalcType::Vasp,
            vec![CompletionCheck {
                file: "OUTCAR".to_string(),
                // the leading space is part of the marker VASP prints
                contains: Some(
                    " General timing and accounting informations for this job:".to_string(),
                ),
            }],
        );

        Self {
            input_files,
            completion_checks,
        }
    }
}

impl Config {
    /// Read a replacement rule table from a JSON file. Both tables must be
    /// present; there is no partial merge with the defaults.
    pub fn load(path: &Path) -> Result<Config> {
        info!("Loading rule tables from {}", path.display());
        files::read_json(path)
            .with_context(|| format!("reading config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_cover_both_codes() {
        let config = Config::default();
        assert_eq!(
            config.input_files[&CalcType::Feff],
            vec!["feff.inp".to_string()]
        );
        assert_eq!(config.input_files[&CalcType::Vasp].len(), 4);
        assert_eq!(config.completion_checks[&CalcType::Feff].len(), 2);
        assert_eq!(
            config.completion_checks[&CalcType::Feff][0].contains,
            None
        );
        assert!(config.completion_checks[&CalcType::Vasp][0]
            .contains
            .as_deref()
            .unwrap()
            .starts_with(' '));
    }

    #[test]
    fn unknown_calc_type_is_rejected() {
        let json = r#"{
            "input_files": {"ABINIT": ["abinit.in"]},
            "completion_checks": {}
        }"#;
        let parsed: Result<Config, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn check_without_contains_deserialises() {
        let check: CompletionCheck =
            serde_json::from_str(r#"{"file": "xmu.dat"}"#).unwrap();
        assert_eq!(check.file, "xmu.dat");
        assert_eq!(check.contains, None);
    }
}
