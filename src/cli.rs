//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::binarize::BinarizeMode;
use crate::config::{CliOverrides, EdgeConfig};
use crate::pipeline::ProgressCallback;
use crate::progress::ProcessingStage;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Invalid arguments or configuration
    InvalidArgs = 2,
    /// Input file not found
    InputNotFound = 3,
    /// Output could not be written
    OutputError = 4,
    /// Error while processing an image
    ProcessingError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file not found",
            ExitCode::OutputError => "Output error (permission denied, disk full, etc.)",
            ExitCode::ProcessingError => "Processing error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Binarization and margin removal for scanned pages
#[derive(Parser, Debug)]
#[command(name = "scanprep")]
#[command(version)]
#[command(about = "Binarization and margin removal for scanned pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: ./scanprep.toml, then the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel threads (default: available CPUs)
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Binarize an image with Sauvola's method
    Binarize(BinarizeArgs),
    /// Wipe the sections of an image outside the content area
    Wipe(WipeArgs),
    /// Binarize and wipe an image
    Preproc(PreprocArgs),
    /// Binarize and wipe an image at several k levels, saving <outbase>_bin<k>.png
    PreprocMulti(PreprocMultiArgs),
    /// Binarize and wipe many images in parallel
    Batch(BatchArgs),
    /// Report the ink proportion of strips across an image
    Profile(ProfileArgs),
    /// Show build and system information
    Info,
}

/// Sauvola parameters shared by the binarizing commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SauvolaArgs {
    /// Sauvola k; lower it for very light text (try 0.1 or 0.2) [default: 0.5]
    #[arg(short)]
    pub k: Option<f64>,

    /// Binarization window size; 0 or unset picks width / 60
    #[arg(long = "bw")]
    pub binarize_window_size: Option<u32>,

    /// Binarization type: binary or zeroinv [default: binary]
    #[arg(long = "bt")]
    pub mode: Option<BinarizeMode>,
}

/// Wipe parameters shared by the wiping commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WipeParamArgs {
    /// Horizontal wipe window size [default: 5]
    #[arg(long = "ws")]
    pub horizontal_window_size: Option<u32>,

    /// Proportion of ink below which a horizontal window counts as margin [default: 0.05]
    #[arg(long = "wt")]
    pub threshold: Option<f64>,

    /// Minimum content width as a percentage of the page width [default: 30]
    #[arg(short = 'm')]
    pub min_percent: Option<u32>,

    /// Vertical wipe window size, about line height plus the largest gap [default: 120]
    #[arg(long = "vw")]
    pub vertical_window_size: Option<u32>,

    /// Proportion of ink below which a vertical window counts as margin [default: 0.005]
    #[arg(long = "vt")]
    pub vertical_threshold: Option<f64>,

    /// Minimum content height as a percentage of the page height [default: 30]
    #[arg(long = "vm")]
    pub vertical_min_percent: Option<u32>,
}

impl WipeParamArgs {
    fn horizontal(&self) -> EdgeConfig {
        EdgeConfig {
            window_size: self.horizontal_window_size,
            threshold: self.threshold,
            min_content_percent: self.min_percent,
            strategy: None,
        }
    }

    fn vertical(&self) -> EdgeConfig {
        EdgeConfig {
            window_size: self.vertical_window_size,
            threshold: self.vertical_threshold,
            min_content_percent: self.vertical_min_percent,
            strategy: None,
        }
    }
}

/// Arguments for the binarize command
#[derive(clap::Args, Debug)]
pub struct BinarizeArgs {
    /// Input image
    pub input: PathBuf,

    /// Output PNG
    pub output: PathBuf,

    #[command(flatten)]
    pub sauvola: SauvolaArgs,
}

/// Arguments for the wipe command
#[derive(clap::Args, Debug)]
pub struct WipeArgs {
    /// Input image (ideally already binarized)
    pub input: PathBuf,

    /// Output PNG
    pub output: PathBuf,

    #[command(flatten)]
    pub wipe: WipeParamArgs,
}

/// Arguments for the preproc command
#[derive(clap::Args, Debug)]
pub struct PreprocArgs {
    /// Input image
    pub input: PathBuf,

    /// Output PNG
    pub output: PathBuf,

    #[command(flatten)]
    pub sauvola: SauvolaArgs,

    #[command(flatten)]
    pub wipe: WipeParamArgs,

    /// Disable wiping completely
    #[arg(long = "nowipe")]
    pub no_wipe: bool,
}

/// Arguments for the preproc-multi command
#[derive(clap::Args, Debug)]
pub struct PreprocMultiArgs {
    /// Input image
    pub input: PathBuf,

    /// Output base name (default: input path without extension)
    pub outbase: Option<PathBuf>,

    /// k levels to binarize with
    #[arg(long = "ks", value_delimiter = ',', default_values_t = crate::pipeline::DEFAULT_MULTI_K)]
    pub ks: Vec<f64>,

    /// Binarization window size; 0 or unset picks width / 60
    #[arg(long = "bw")]
    pub binarize_window_size: Option<u32>,

    /// Binarization type: binary or zeroinv [default: binary]
    #[arg(long = "bt")]
    pub mode: Option<BinarizeMode>,

    #[command(flatten)]
    pub wipe: WipeParamArgs,

    /// Disable wiping completely
    #[arg(long = "nowipe")]
    pub no_wipe: bool,
}

/// Arguments for the batch command
#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// Input images
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory, written as <stem>_clean.png
    #[arg(short, long, default_value = "./output")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub sauvola: SauvolaArgs,

    #[command(flatten)]
    pub wipe: WipeParamArgs,

    /// Disable wiping completely
    #[arg(long = "nowipe")]
    pub no_wipe: bool,
}

/// Arguments for the profile command
#[derive(clap::Args, Debug)]
pub struct ProfileArgs {
    /// Input image (ideally already binarized)
    pub input: PathBuf,

    /// Strip width in pixels (height in vertical mode)
    #[arg(short, long, default_value_t = 5)]
    pub width: u32,

    /// Slice from top to bottom rather than left to right
    #[arg(long)]
    pub vertical: bool,

    /// Print every sample as JSON instead of the middle min/max summary
    #[arg(long)]
    pub json: bool,

    /// Write the JSON profile to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SauvolaArgs {
    fn apply(&self, overrides: CliOverrides) -> CliOverrides {
        CliOverrides {
            k: self.k,
            window_size: self.binarize_window_size,
            mode: self.mode,
            ..overrides
        }
    }
}

fn wipe_overrides(wipe: &WipeParamArgs, no_wipe: bool, threads: Option<usize>) -> CliOverrides {
    CliOverrides {
        wipe: no_wipe.then_some(false),
        horizontal: wipe.horizontal(),
        vertical: wipe.vertical(),
        threads,
        ..Default::default()
    }
}

impl Cli {
    /// Collect the command line values that override the config file
    pub fn overrides(&self) -> CliOverrides {
        let base = CliOverrides {
            threads: self.threads,
            ..Default::default()
        };
        match &self.command {
            Commands::Binarize(args) => args.sauvola.apply(base),
            Commands::Wipe(args) => wipe_overrides(&args.wipe, false, self.threads),
            Commands::Preproc(args) => {
                args.sauvola.apply(wipe_overrides(&args.wipe, args.no_wipe, self.threads))
            }
            Commands::PreprocMulti(args) => CliOverrides {
                window_size: args.binarize_window_size,
                mode: args.mode,
                ..wipe_overrides(&args.wipe, args.no_wipe, self.threads)
            },
            Commands::Batch(args) => {
                args.sauvola.apply(wipe_overrides(&args.wipe, args.no_wipe, self.threads))
            }
            Commands::Profile(_) | Commands::Info => base,
        }
    }
}

/// Output path of a batch job: `<dir>/<stem>_clean.png`
pub fn batch_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{}_clean.png", stem))
}

/// Create a styled progress bar for file processing
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

/// Progress callback drawing on an indicatif bar
pub struct BarProgress {
    bar: ProgressBar,
    show_stages: bool,
}

impl BarProgress {
    pub fn new(bar: ProgressBar, show_stages: bool) -> Self {
        Self { bar, show_stages }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ProgressCallback for BarProgress {
    fn on_stage(&self, input: &Path, stage: ProcessingStage) {
        if self.show_stages {
            let name = input.file_name().unwrap_or_default().to_string_lossy();
            self.bar.set_message(format!("{}: {}", name, stage.name()));
        }
        self.bar.tick();
    }

    fn on_file_complete(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }
}
