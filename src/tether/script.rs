//! SBATCH header parsing and submission-script synthesis

use std::path::PathBuf;

use crate::tether::Error;

/// Ordered SLURM directives for the script header.
#[derive(Debug, Clone, PartialEq)]
pub struct SlurmHeader {
    directives: Vec<(String, String)>,
}

impl SlurmHeader {
    /// Parse `key=value` command-line entries into directives, keeping
    /// their order. Everything after the first `=` belongs to the value, so
    /// `time=01:00:00` and `export=ALL` both parse.
    pub fn parse(entries: &[String]) -> Result<SlurmHeader, Error> {
        let mut directives = Vec::with_capacity(entries.len());
        for entry in entries {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| Error::InvalidSlurmDirective(entry.clone()))?;
            directives.push((key.to_string(), value.to_string()));
        }
        Ok(SlurmHeader { directives })
    }

    fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.directives
            .iter()
            .map(|(key, value)| format!("#SBATCH --{key}={value}"))
    }
}

/// One synthesized submission script, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitScript {
    lines: Vec<String>,
}

impl SubmitScript {
    /// Assemble the script sections in order: shebang and SBATCH header,
    /// the one-time pre-execution lines, a `cd` into each directory of the
    /// chunk followed by every executable line, and the trailing `wait` /
    /// `exit` that keeps the allocation alive until the backgrounded jobs
    /// finish.
    pub fn synthesize(
        header: &SlurmHeader,
        pre_lines: &[String],
        chunk: &[PathBuf],
        exe_lines: &[String],
    ) -> SubmitScript {
        let mut lines = vec!["#!/bin/bash".to_string()];
        lines.extend(header.lines());
        lines.push(String::new());
        if !pre_lines.is_empty() {
            lines.extend(pre_lines.iter().cloned());
            lines.push(String::new());
        }
        for dir in chunk {
            lines.push(format!("cd {}", dir.display()));
            lines.extend(exe_lines.iter().cloned());
        }
        lines.push(String::new());
        lines.push("wait".to_string());
        lines.push("exit".to_string());
        SubmitScript { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
