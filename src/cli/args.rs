//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Space Ranger helper: discover Visium samples, run spaceranger count, install dependencies
#[derive(Parser, Debug)]
#[command(name = "srhelper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (overrides the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process one sample with spaceranger count
    Run {
        /// Sample name in samples_dir, or path to a sample directory
        sample: String,
        /// Run id (default: sample name)
        #[arg(long)]
        id: Option<String>,
        /// Slide serial number
        #[arg(long, requires = "area")]
        slide: Option<String>,
        /// Capture area, e.g. A1
        #[arg(long, requires = "slide")]
        area: Option<String>,
        /// JSON pipeline file (see create-config)
        #[arg(long, value_hint = ValueHint::FilePath)]
        pipeline: Option<PathBuf>,
        /// Print the spaceranger command instead of running it
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Extra arguments passed to spaceranger verbatim
        #[arg(last = true)]
        extra: Vec<String>,
    },

    /// List samples and whether they are ready to process
    List {
        /// Directory to scan (default: samples_dir)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Install required programs and reference files
    InstallDependencies {
        /// Installation directory (default: install_dir)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Install everything not excluded, without prompting
        #[arg(short, long)]
        yes: bool,
        /// Skip space ranger
        #[arg(long)]
        no_spaceranger: bool,
        /// Skip the human reference genome
        #[arg(long)]
        no_human: bool,
        /// Skip the mouse reference genome
        #[arg(long)]
        no_mouse: bool,
    },

    /// Create an empty pipeline configuration file
    ///
    /// Fill in "space ranger directory", "genome installation directory" and
    /// "output directory", then add one entry per sample with its "name"
    /// (sample directory) and "image" (relative to the sample directory).
    /// Use it with `srhelper run <sample> --pipeline <file>`.
    CreateConfig {
        /// Configuration file name (must end in .json)
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template at the global location
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
