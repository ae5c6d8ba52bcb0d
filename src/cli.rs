use clap::{Parser, Subcommand};
use log::Level;

use std::path::PathBuf;
use std::time::Duration;

use crate::consts::*;
use crate::core::RunOptions;
use crate::error::{LooperError, Result};
use crate::executor::conductor::SubmissionSettings;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubArgs,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Increase verbosity",
        global = true
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Decrease verbosity",
        global = true,
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Log level requested on the command line
    pub fn level(&self) -> Level {
        if self.verbose {
            Level::Debug
        } else if self.quiet {
            Level::Warn
        } else {
            Level::Info
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum SubArgs {
    #[command(name = "run")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
    #[command(name = "check")]
    Check {
        #[command(flatten)]
        args: CheckArgs,
    },
}

/// Submit every sample of a project to its pipelines
///
/// # Example
///
/// ```bash,no_run
/// looper run -c project.toml --compute slurm --lumpn 10
/// ```
///
/// # Arguments
///
/// * `config` - Path to the project configuration file
/// * `compute` - Compute package used to submit jobs
/// * `dry_run` - Write submission scripts without submitting them
/// * `ignore_flags` - Submit samples even if a run flag exists
/// * `lumpn` - Number of commands bundled into one job
/// * `lump` - Input size (GB) bundled into one job
/// * `delay` - Seconds to sleep after each submission
/// * `limit` - Only process the first N samples
/// * `partition` - Partition overriding tier and compute settings
/// * `no_priority` - Use pipelines from every source, not only the first one
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the project configuration file",
        value_name = "CONFIG",
        default_value = "project.toml"
    )]
    pub config: PathBuf,

    #[arg(
        long = "compute",
        help = "Compute package used to submit jobs",
        value_name = "COMPUTE",
        default_value = DEFAULT_COMPUTE
    )]
    pub compute: String,

    #[arg(short = 'd', long = "dry-run", help = "Write scripts without submitting")]
    pub dry_run: bool,

    #[arg(long = "ignore-flags", help = "Submit samples even if run flags exist")]
    pub ignore_flags: bool,

    #[arg(
        long = "lumpn",
        help = "Number of commands bundled into a single job",
        value_name = "N"
    )]
    pub lumpn: Option<usize>,

    #[arg(
        long = "lump",
        help = "Cumulative input size (GB) bundled into a single job",
        value_name = "GB"
    )]
    pub lump: Option<f64>,

    #[arg(
        long = "delay",
        help = "Seconds to sleep after each submission",
        value_name = "SECONDS",
        default_value_t = 0
    )]
    pub delay: u64,

    #[arg(long = "limit", help = "Only process the first N samples", value_name = "N")]
    pub limit: Option<usize>,

    #[arg(
        short = 'p',
        long = "partition",
        help = "Partition overriding tier and compute settings",
        value_name = "PARTITION"
    )]
    pub partition: Option<String>,

    #[arg(
        long = "no-priority",
        help = "Use pipelines from every interface source that defines the protocol"
    )]
    pub no_priority: bool,
}

impl RunArgs {
    /// Check argument values clap cannot validate on its own
    pub fn check(&self) -> Result<()> {
        if self.lumpn == Some(0) {
            return Err(LooperError::InvalidInput(
                "--lumpn must be a positive integer".into(),
            ));
        }

        if let Some(lump) = self.lump {
            if lump.is_nan() || lump <= 0.0 {
                return Err(LooperError::InvalidInput(format!(
                    "--lump must be a positive size in GB, got {}",
                    lump
                )));
            }
        }

        Ok(())
    }

    /// Translate command line arguments into run options
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use clap::Parser;
    /// # use looper::cli::RunArgs;
    /// let args = RunArgs::parse_from(["run", "--lumpn", "2", "--dry-run"]);
    /// let options = args.options();
    ///
    /// assert_eq!(options.settings.max_commands, Some(2));
    /// assert!(options.settings.dry_run);
    /// ```
    pub fn options(&self) -> RunOptions {
        RunOptions {
            compute: self.compute.clone(),
            settings: SubmissionSettings {
                dry_run: self.dry_run,
                delay: Duration::from_secs(self.delay),
                ignore_flags: self.ignore_flags,
                partition: self.partition.clone(),
                automatic: true,
                max_commands: self.lumpn,
                max_size: self.lump,
            },
            limit: self.limit,
            priority: !self.no_priority,
        }
    }
}

/// Summarize the run flags of a project
///
/// # Example
///
/// ```bash,no_run
/// looper check -c project.toml
/// ```
#[derive(Debug, Parser, Clone)]
pub struct CheckArgs {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the project configuration file",
        value_name = "CONFIG",
        default_value = "project.toml"
    )]
    pub config: PathBuf,

    #[arg(
        long = "no-priority",
        help = "Use pipelines from every interface source that defines the protocol"
    )]
    pub no_priority: bool,
}
