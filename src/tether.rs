//! The tether pipeline: combine many small jobs into composite SLURM
//! submissions
//!
//! Schedulers handle a handful of fat allocations far better than thousands
//! of one-core jobs. tether packs the per-directory work into a few submit
//! scripts that background each calculation and `wait`, so a single
//! allocation runs a whole chunk in parallel up to the node's core count.

pub mod chunk;
pub mod script;
pub mod stage;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use log::{debug, info};

use crate::search;
use crate::tether::script::{SlurmHeader, SubmitScript};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("calculations per staged job must be positive")]
    InvalidChunkSize,
    #[error("slurm line {0:?} is not of the form key=value")]
    InvalidSlurmDirective(String),
    #[error(
        "& is not found at the end of executable line {0:?}; it is required \
         so the jobs in a chunk run in parallel; nothing has been written"
    )]
    NoBackgroundMarker(String),
    #[error("staging directory {0} already exists")]
    StageDirExists(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Inputs for one tether run.
#[derive(Debug)]
pub struct TetherRun {
    pub directory: PathBuf,
    pub filename: String,
    pub staging_directory: PathBuf,
    pub calculations_per_staged_job: usize,
    pub slurm_lines: Vec<String>,
    pub post_slurm_lines: Vec<String>,
    pub exe_lines: Vec<String>,
}

/// Discover the work directories, partition them, and stage one submit
/// script per chunk.
///
/// All configuration is validated before anything touches the filesystem,
/// so a bad invocation leaves no partial staging tree behind.
pub fn run(params: &TetherRun) -> Result<()> {
    for line in &params.exe_lines {
        if !has_background_marker(line) {
            return Err(Error::NoBackgroundMarker(line.clone()).into());
        }
    }
    if params.calculations_per_staged_job == 0 {
        return Err(Error::InvalidChunkSize.into());
    }
    let header = SlurmHeader::parse(&params.slurm_lines)?;

    info!(
        "Tethering jobs for {}, looking for filename {}",
        params.directory.display(),
        params.filename
    );
    info!("Staging to {}", params.staging_directory.display());
    info!(
        "Calculations per staged job: {}",
        params.calculations_per_staged_job
    );
    for line in &params.exe_lines {
        info!("Executable line: {line}");
    }
    debug!("Slurm header is {:?}", params.slurm_lines);

    let directories = search::find_marker_dirs(&params.directory, &params.filename)?;
    info!("Found {} directory matches", directories.len());
    let directories = absolutize(&directories).map_err(Error::Io)?;

    let chunks = chunk::partition(&directories, params.calculations_per_staged_job)?;
    let scripts: Vec<SubmitScript> = chunks
        .iter()
        .map(|chunk| {
            SubmitScript::synthesize(
                &header,
                &params.post_slurm_lines,
                chunk,
                &params.exe_lines,
            )
        })
        .collect();

    info!("Saving {} submit scripts to staging directory", scripts.len());
    stage::write_batches(&scripts, &params.staging_directory)?;
    Ok(())
}

/// The `&` must sit within the last two characters, so both `feff &` and
/// `feff&` pass.
fn has_background_marker(line: &str) -> bool {
    line.chars().rev().take(2).any(|c| c == '&')
}

/// Absolute forms of the discovered directories, without resolving
/// symlinks; the generated `cd` lines must work from any working directory
/// the scheduler starts the script in.
fn absolutize(dirs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    dirs.iter().map(std::path::absolute).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn params(root: &std::path::Path, staging: PathBuf) -> TetherRun {
        TetherRun {
            directory: root.to_path_buf(),
            filename: "feff.inp".to_string(),
            staging_directory: staging,
            calculations_per_staged_job: 2,
            slurm_lines: vec!["job-name=test".to_string()],
            post_slurm_lines: Vec::new(),
            exe_lines: vec!["feff &".to_string()],
        }
    }

    #[test]
    fn background_marker_positions() {
        assert!(has_background_marker("feff &"));
        assert!(has_background_marker("feff&"));
        assert!(has_background_marker("feff & "));
        assert!(!has_background_marker("feff"));
        assert!(!has_background_marker("a & b"));
    }

    #[test]
    fn foreground_exe_line_aborts_before_any_write() {
        let tmp = tempdir().unwrap();
        let staging = tmp.path().join("staging");
        let mut p = params(tmp.path(), staging.clone());
        p.exe_lines = vec!["feff".to_string()];
        assert!(run(&p).is_err());
        assert!(!staging.exists());
    }

    #[test]
    fn malformed_slurm_line_aborts_before_any_write() {
        let tmp = tempdir().unwrap();
        let staging = tmp.path().join("staging");
        let mut p = params(tmp.path(), staging.clone());
        p.slurm_lines = vec!["job-name".to_string()];
        assert!(run(&p).is_err());
        assert!(!staging.exists());
    }

    #[test]
    fn stages_one_script_per_chunk() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("runs");
        for name in ["a", "b", "c"] {
            fs::create_dir_all(root.join(name)).unwrap();
            fs::write(root.join(name).join("feff.inp"), "x").unwrap();
        }
        let staging = tmp.path().join("staging");
        run(&params(&root, staging.clone())).unwrap();

        // 3 directories, 2 per job: chunks of 2 and 1.
        let first = fs::read_to_string(staging.join("0").join("submit.sbatch")).unwrap();
        let second = fs::read_to_string(staging.join("1").join("submit.sbatch")).unwrap();
        assert_eq!(first.matches("cd ").count(), 2);
        assert_eq!(second.matches("cd ").count(), 1);
        assert!(first.contains("#SBATCH --job-name=test"));
        assert!(first.ends_with("wait\nexit\n"));
        // cd targets are absolute
        assert!(second.contains(&format!("cd {}", root.join("c").display())));
    }

    #[test]
    fn no_matches_stages_nothing() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("runs");
        fs::create_dir_all(&root).unwrap();
        let staging = tmp.path().join("staging");
        run(&params(&root, staging.clone())).unwrap();
        assert!(!staging.exists());
    }
}
