//! valjakko packs many small FEFF/VASP calculation directories into
//! composite SLURM submissions and reports which calculations finished.

pub mod check;
pub mod cli;
pub mod config;
pub mod files;
pub mod report;
pub mod search;
pub mod tether;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{info, Level, LevelFilter};

use crate::cli::{Cli, Command};
use crate::config::Config;

/// Parse the command line, set up logging, and run the requested pipeline.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    info!("valjakko starting up");

    match cli.command {
        Command::Report {
            directory,
            filename,
            report_path,
            config,
        } => {
            let config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };
            let report = report::build_report(&directory, &filename, &config)?;
            files::save_json(&report, &report_path)?;
            info!("Report written to {}", report_path.display());
        }
        Command::Tether {
            directory,
            filename,
            tether_directory,
            calculations_per_staged_job,
            slurm_lines,
            exe_lines,
            post_slurm_lines,
        } => {
            let staging_directory = tether_directory
                .unwrap_or_else(|| default_staging_directory(&directory));
            tether::run(&tether::TetherRun {
                directory,
                filename,
                staging_directory,
                calculations_per_staged_job,
                slurm_lines,
                post_slurm_lines,
                exe_lines,
            })?;
        }
        Command::Check {
            directory,
            filename,
            require,
            report_path,
        } => {
            check::run(&directory, &filename, &require, &report_path)?;
        }
    }

    Ok(())
}

/// The search directory path with a literal `_tether` suffix appended.
fn default_staging_directory(search_directory: &std::path::Path) -> PathBuf {
    let mut path = search_directory.to_path_buf().into_os_string();
    path.push("_tether");
    PathBuf::from(path)
}

/// Configure the two output formats.
///
/// The everyday format keeps info lines bare and prefixes warnings and
/// errors with their level. `--debug` lowers the filter and switches to a
/// timestamped line format with the record's origin.
fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        builder.filter_level(LevelFilter::Debug).format(|buf, record| {
            writeln!(
                buf,
                "{} {}:{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.target(),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        });
    } else {
        builder.filter_level(LevelFilter::Info).format(|buf, record| {
            if record.level() <= Level::Warn {
                writeln!(buf, "{}: {}", record.level(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        });
    }
    builder.init();
}
