use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strata_observe::{LoggerFormat, LoggerLevel};
use strata_pipeline::Stage;

/// Staged batch orchestration for the segmentation toolchain.
#[derive(Parser, Debug)]
#[command(name = "strata", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the classifier pipeline
    Run(RunArgs),

    /// Validate a configuration and report discovered inputs
    Check {
        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// List stages in execution order
    Stages,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipeline configuration (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Skip jobs whose outputs are already valid
    #[arg(long)]
    pub resume: bool,

    /// Run later stages even after a stage had failed jobs
    #[arg(long)]
    pub keep_going: bool,

    /// Run only these stages (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<Stage>,

    /// Override the maximum number of parallel jobs
    #[arg(long)]
    pub max_parallel: Option<usize>,

    /// Override the thread budget of each job
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log filter (EnvFilter syntax), overrides the config
    #[arg(long)]
    pub log_level: Option<LoggerLevel>,

    /// Log format: text, json or journald
    #[arg(long)]
    pub log_format: Option<LoggerFormat>,

    /// Write Prometheus text metrics here when the run ends
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,
}
