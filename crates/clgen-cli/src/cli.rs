use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "clgen CLI - tools for the exploration stage of concurrent-learning workflows: MD settings, configuration filtering, exploration reports, and workflow-service configuration.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the MD settings of an exploration stage and print them as JSON.
    Md(MdArgs),
    /// Classify frames by model deviation and select candidates for labeling.
    Report(ReportArgs),
    /// Drop unphysical frames from a configuration set.
    Filter(FilterArgs),
    /// Show the resolved workflow-service configuration.
    Workflow(WorkflowArgs),
    /// Wrap a binary input file (e.g. a frozen model) into a portable artifact.
    Pack(PackArgs),
    /// Write the bytes stored in an artifact back to disk.
    Unpack(UnpackArgs),
}

/// Arguments for the `md` subcommand.
#[derive(Args, Debug)]
pub struct MdArgs {
    /// Path to the input configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the JSON to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S md.nsteps=5000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Path to the input configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Model-deviation tables, one per trajectory.
    #[arg(required = true, value_name = "MODEL_DEVI", num_args(1..))]
    pub model_devi: Vec<PathBuf>,

    /// Override the maximum number of candidates to select.
    #[arg(short = 'n', long, value_name = "INT")]
    pub max_candidates: Option<usize>,

    /// Override the accurate ratio at which the stage counts as converged.
    #[arg(long, value_name = "FLOAT")]
    pub conv_accuracy: Option<f64>,

    /// Stage index printed in the report line.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub stage: usize,

    /// Index within the stage printed in the report line.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub stage_index: usize,

    /// Iteration index printed in the report line.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub iteration: usize,

    /// Write the selected candidate ids and ratios to this JSON file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S exploration.trust-levels.level-f-hi=0.4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `filter` subcommand.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Path to the input configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Configuration set (JSON) to filter.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Where to write the frames that pass every filter.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `workflow` subcommand.
#[derive(Args, Debug)]
pub struct WorkflowArgs {
    /// Path to the input configuration file (TOML, or JSON with a `.json` extension).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Print credentials in clear text instead of masking them.
    #[arg(long)]
    pub show_secrets: bool,
}

/// Arguments for the `pack` subcommand.
#[derive(Args, Debug)]
pub struct PackArgs {
    /// The binary file to wrap.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Required extension of the input file (e.g. 'pb').
    #[arg(short, long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Path of the artifact to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `unpack` subcommand.
#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Artifact produced by `clgen pack`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub artifact: PathBuf,

    /// Path of the file to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
