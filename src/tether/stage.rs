//! Zero-padded staging of submit scripts

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::tether::script::SubmitScript;
use crate::tether::Error;

/// File name every staged script is written under.
pub const SCRIPT_NAME: &str = "submit.sbatch";

/// Write each script into its own zero-padded numbered subdirectory of
/// `target_root`, refusing to reuse an existing one.
///
/// The padding width is the decimal digit count of the script total, so 37
/// scripts land in `00` through `36`. Already-written indices are not
/// rolled back when a later one fails; the fixed script name makes the
/// partial state obvious to an operator. Zero scripts create nothing, not
/// even the staging root.
pub fn write_batches(scripts: &[SubmitScript], target_root: &Path) -> Result<(), Error> {
    if scripts.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(target_root).map_err(Error::Io)?;

    let width = scripts.len().to_string().len();
    for (index, script) in scripts.iter().enumerate() {
        let dir = target_root.join(format!("{index:0width$}"));
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::StageDirExists(dir));
            }
            Err(err) => return Err(Error::Io(err)),
        }
        let path = dir.join(SCRIPT_NAME);
        let mut file = File::create(&path).map_err(Error::Io)?;
        for line in script.lines() {
            writeln!(file, "{line}").map_err(Error::Io)?;
        }
        debug!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tether::script::SlurmHeader;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn scripts(n: usize) -> Vec<SubmitScript> {
        let header = SlurmHeader::parse(&["job-name=test".to_string()]).unwrap();
        (0..n)
            .map(|i| {
                SubmitScript::synthesize(
                    &header,
                    &[],
                    &[PathBuf::from(format!("/work/{i}"))],
                    &["run.sh &".to_string()],
                )
            })
            .collect()
    }

    #[test]
    fn thirty_seven_scripts_pad_to_width_two() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("staging");
        write_batches(&scripts(37), &root).unwrap();

        assert!(root.join("00").join(SCRIPT_NAME).is_file());
        assert!(root.join("09").join(SCRIPT_NAME).is_file());
        assert!(root.join("36").join(SCRIPT_NAME).is_file());
        assert!(!root.join("37").exists());
        assert!(!root.join("0").exists());
    }

    #[test]
    fn single_script_uses_width_one() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("staging");
        write_batches(&scripts(1), &root).unwrap();
        assert!(root.join("0").join(SCRIPT_NAME).is_file());
    }

    #[test]
    fn script_lines_are_written_one_per_line() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("staging");
        let batch = scripts(1);
        write_batches(&batch, &root).unwrap();

        let written = fs::read_to_string(root.join("0").join(SCRIPT_NAME)).unwrap();
        let expected: String = batch[0]
            .lines()
            .iter()
            .map(|line| format!("{line}\n"))
            .collect();
        assert_eq!(written, expected);
    }

    #[test]
    fn existing_numbered_directory_is_fatal() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("staging");
        fs::create_dir_all(root.join("1")).unwrap();

        let err = write_batches(&scripts(3), &root).unwrap_err();
        assert!(matches!(err, Error::StageDirExists(_)));
        // Index 0 was written before the collision and survives.
        assert!(root.join("0").join(SCRIPT_NAME).is_file());
        assert!(!root.join("2").exists());
    }

    #[test]
    fn zero_scripts_create_nothing() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("staging");
        write_batches(&[], &root).unwrap();
        assert!(!root.exists());
    }
}
