//! Command-line definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Batch small HPC calculations into composite SLURM submissions and report
/// on their completion.
#[derive(Debug, Parser)]
#[command(name = "valjakko", version, about)]
pub struct Cli {
    /// Enable the DEBUG stream, with a verbose line format better suited to
    /// detecting issues
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify every calculation directory under a root and report which
    /// jobs completed
    Report {
        /// Directory to search for the file name
        #[arg(long, value_name = "DIR")]
        directory: PathBuf,

        /// File to search for; marks a directory as holding a calculation
        #[arg(long, value_name = "MARKER")]
        filename: String,

        /// Path to the JSON report that will be saved
        #[arg(long, value_name = "FILE", default_value = "report.json")]
        report_path: PathBuf,

        /// JSON file replacing the compiled-in rule tables
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Combine many small jobs into composite submission scripts, one per
    /// chunk of directories
    Tether {
        /// Directory to search for the file name
        #[arg(long, value_name = "DIR")]
        directory: PathBuf,

        /// File to search for, which marks a directory in which you want to
        /// run a job
        #[arg(long, value_name = "MARKER")]
        filename: String,

        /// Directory to save the tether submit files in (if not provided,
        /// defaults to the search directory name with a _tether suffix)
        #[arg(long, value_name = "DIR")]
        tether_directory: Option<PathBuf>,

        /// Number of calculations per staged job; usually more or less the
        /// number of cores on a node
        #[arg(short, long, value_name = "N", default_value_t = 36)]
        calculations_per_staged_job: usize,

        /// SLURM parameter as KEY=VALUE, rendered as an #SBATCH directive
        #[arg(
            short = 's',
            long = "slurm-line",
            value_name = "KEY=VALUE",
            required = true
        )]
        slurm_lines: Vec<String>,

        /// Executable line to be run in every directory found; must end
        /// with & so the jobs of a chunk run in parallel
        #[arg(short = 'l', long = "exe-line", value_name = "LINE", required = true)]
        exe_lines: Vec<String>,

        /// Lines which are not SLURM commands but are run once before other
        /// parts of the script are executed (such as export or module
        /// loading)
        #[arg(short = 'p', long = "post-slurm-line", value_name = "LINE")]
        post_slurm_lines: Vec<String>,
    },

    /// Quickly test output files for a required line and report failures
    Check {
        /// Directory to recursively search for the file name
        #[arg(long, value_name = "DIR")]
        directory: PathBuf,

        /// File to search for
        #[arg(long, value_name = "NAME")]
        filename: String,

        /// Requires that this text be found in the specified file
        #[arg(long, value_name = "TEXT")]
        require: String,

        /// Path to the report text file that will be saved
        #[arg(long, value_name = "FILE", default_value = "report.txt")]
        report_path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn tether_defaults_and_repeats() {
        let cli = Cli::parse_from([
            "valjakko",
            "tether",
            "--directory",
            "runs",
            "--filename",
            "feff.inp",
            "-s",
            "job-name=test",
            "-s",
            "time=01:00:00",
            "-l",
            "feff &",
        ]);
        match cli.command {
            Command::Tether {
                calculations_per_staged_job,
                slurm_lines,
                exe_lines,
                post_slurm_lines,
                tether_directory,
                ..
            } => {
                assert_eq!(calculations_per_staged_job, 36);
                assert_eq!(slurm_lines, vec!["job-name=test", "time=01:00:00"]);
                assert_eq!(exe_lines, vec!["feff &"]);
                assert!(post_slurm_lines.is_empty());
                assert!(tether_directory.is_none());
            }
            other => panic!("expected tether, got {other:?}"),
        }
    }

    #[test]
    fn debug_flag_is_global() {
        let cli = Cli::parse_from([
            "valjakko",
            "check",
            "--directory",
            "runs",
            "--filename",
            "feff.out",
            "--require",
            "feff ends at",
            "--debug",
        ]);
        assert!(cli.debug);
    }
}
