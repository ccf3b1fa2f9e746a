//! scanprep - Binarization and margin removal for scanned pages
//!
//! CLI entry point

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, Level};

use scanprep::{
    cli::{
        batch_output_path, BatchArgs, BinarizeArgs, PreprocArgs, PreprocMultiArgs, ProfileArgs,
        WipeArgs,
    },
    util::{load_gray, load_image, output_base},
    BarProgress, BatchJob, Cli, Commands, Config, ConfigError, ExitCode, MarginWiper, OutputMode,
    PipelineError, PreprocessOptions, Preprocessor, ProcessingStage, ProgressCallback,
    ProgressTracker, ProportionProfile,
};

/// Failures raised by the command runners themselves
#[derive(Debug, Error)]
enum CommandError {
    #[error("Could not write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0} file(s) failed to process")]
    BatchFailures(usize),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e).into()
        }
    }
}

/// Install the stderr log subscriber; `-v` raises the level one step each
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PipelineError>() {
            return match e {
                PipelineError::InputNotFound(_) => ExitCode::InputNotFound,
                PipelineError::Io(_) => ExitCode::OutputError,
                _ => ExitCode::ProcessingError,
            };
        }
        if let Some(e) = cause.downcast_ref::<CommandError>() {
            return match e {
                CommandError::Output { .. } => ExitCode::OutputError,
                CommandError::BatchFailures(_) => ExitCode::ProcessingError,
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return ExitCode::InvalidArgs;
        }
    }
    ExitCode::GeneralError
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Info = cli.command {
        return run_info();
    }

    let config =
        Config::load_with(cli.config.as_deref()).context("Failed to load configuration")?;
    let overrides = cli.overrides();
    let threads = config.thread_count(&overrides);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to configure thread pool")?;

    let options = config.merge_with_cli(&overrides);
    let mode = OutputMode::from_flags(
        cli.quiet,
        cli.verbose.max(config.general.verbose.unwrap_or(0)),
    );
    info!(threads, k = options.binarize.k, wipe = options.wipe, "Configuration resolved");

    match &cli.command {
        Commands::Binarize(args) => run_binarize(args, options, mode),
        Commands::Wipe(args) => run_wipe(args, &options),
        Commands::Preproc(args) => run_preproc(args, options, mode),
        Commands::PreprocMulti(args) => run_preproc_multi(args, options, mode),
        Commands::Batch(args) => run_batch(args, options, mode),
        Commands::Profile(args) => run_profile(args),
        Commands::Info => run_info(),
    }
}

// ============ Progress ============

/// Pipeline progress printed through a sequential tracker
struct TrackerProgress(Mutex<ProgressTracker>);

impl TrackerProgress {
    fn start(input: &Path, mode: OutputMode) -> Self {
        let mut tracker = ProgressTracker::new(mode);
        tracker.start_page(&input.display().to_string());
        Self(Mutex::new(tracker))
    }
}

impl ProgressCallback for TrackerProgress {
    fn on_stage(&self, _input: &Path, stage: ProcessingStage) {
        if let Ok(mut tracker) = self.0.lock() {
            if stage == ProcessingStage::Completed {
                tracker.complete_page();
            } else {
                tracker.set_stage(stage);
            }
        }
    }

    fn on_file_complete(&self, _completed: usize, _total: usize) {}
}

// ============ Helpers ============

fn ensure_input(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()).into());
    }
    Ok(())
}

fn save_output(image: &image::DynamicImage, path: &Path) -> anyhow::Result<()> {
    image.save(path).map_err(|e| CommandError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(())
}

// ============ Commands ============

fn run_binarize(
    args: &BinarizeArgs,
    options: PreprocessOptions,
    mode: OutputMode,
) -> anyhow::Result<()> {
    ensure_input(&args.input)?;
    let progress = TrackerProgress::start(&args.input, mode);

    progress.on_stage(&args.input, ProcessingStage::Loading);
    let image = load_image(&args.input)
        .with_context(|| format!("Could not decode image {}", args.input.display()))?;
    info!(
        window_size = options.binarize.effective_window_size(image.width()),
        "Binarization window"
    );

    let preprocessor = Preprocessor::new(PreprocessOptions {
        wipe: false,
        ..options
    });
    let binary = preprocessor.process_reporting(&image, &args.input, &progress)?;

    progress.on_stage(&args.input, ProcessingStage::Saving);
    save_output(&binary, &args.output)?;
    progress.on_stage(&args.input, ProcessingStage::Completed);
    Ok(())
}

fn run_wipe(args: &WipeArgs, options: &PreprocessOptions) -> anyhow::Result<()> {
    ensure_input(&args.input)?;
    let gray = load_gray(&args.input)
        .with_context(|| format!("Could not decode image {}", args.input.display()))?;

    let sides = MarginWiper::wipe_with_report(&gray, &options.horizontal)?;
    info!(
        low = sides.edges.low,
        high = sides.edges.high,
        applied = sides.applied,
        "Horizontal wipe"
    );
    let clean = MarginWiper::vwipe_with_report(&sides.image, &options.vertical)?;
    info!(
        low = clean.edges.low,
        high = clean.edges.high,
        applied = clean.applied,
        "Vertical wipe"
    );

    save_output(&image::DynamicImage::ImageLuma8(clean.image), &args.output)
}

fn run_preproc(
    args: &PreprocArgs,
    options: PreprocessOptions,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let progress = TrackerProgress::start(&args.input, mode);
    Preprocessor::new(options)
        .process_file(&args.input, &args.output, &progress)
        .with_context(|| format!("Failed to preprocess {}", args.input.display()))?;
    Ok(())
}

fn run_preproc_multi(
    args: &PreprocMultiArgs,
    options: PreprocessOptions,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let base = args
        .outbase
        .clone()
        .unwrap_or_else(|| output_base(&args.input));
    let progress = TrackerProgress::start(&args.input, mode);

    let report = Preprocessor::new(options)
        .process_multi_file(&args.input, &base, &args.ks, &progress)
        .with_context(|| format!("Failed to preprocess {}", args.input.display()))?;

    if mode.should_show(OutputMode::Normal) {
        for path in &report.outputs {
            println!("  Saved {}", path.display());
        }
    }
    Ok(())
}

fn run_batch(
    args: &BatchArgs,
    options: PreprocessOptions,
    mode: OutputMode,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.output_dir).map_err(|e| CommandError::Output {
        path: args.output_dir.clone(),
        source: e.into(),
    })?;

    let jobs: Vec<BatchJob> = args
        .inputs
        .iter()
        .map(|input| BatchJob::new(input, batch_output_path(input, &args.output_dir)))
        .collect();

    let bar = if mode.should_show(OutputMode::Normal) {
        scanprep::create_progress_bar(jobs.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    let progress = BarProgress::new(bar, mode.should_show(OutputMode::Verbose));

    let results = Preprocessor::new(options).process_batch(&jobs, &progress);
    progress.finish("done");

    let mut error_count = 0usize;
    for (job, result) in jobs.iter().zip(&results) {
        match result {
            Ok(report) => info!(
                input = %job.input.display(),
                elapsed = report.elapsed_secs,
                "Processed"
            ),
            Err(e) => {
                eprintln!("Error processing {}: {}", job.input.display(), e);
                error_count += 1;
            }
        }
    }

    if mode.should_show(OutputMode::Normal) {
        ProgressTracker::print_summary(jobs.len() - error_count, error_count);
    }

    if error_count > 0 {
        return Err(CommandError::BatchFailures(error_count).into());
    }
    Ok(())
}

fn run_profile(args: &ProfileArgs) -> anyhow::Result<()> {
    ensure_input(&args.input)?;
    let gray = load_gray(&args.input)
        .with_context(|| format!("Could not decode image {}", args.input.display()))?;
    let profile = ProportionProfile::compute(&gray, args.width, args.vertical)?;

    if args.json || args.output.is_some() {
        let json = serde_json::to_string_pretty(&profile)?;
        match &args.output {
            Some(path) => std::fs::write(path, json).map_err(|e| CommandError::Output {
                path: path.clone(),
                source: e.into(),
            })?,
            None => println!("{}", json),
        }
        return Ok(());
    }

    match profile.middle_range() {
        Some(range) => {
            println!("{} {:.2} {:.2}", args.input.display(), range.min, range.max);
            Ok(())
        }
        None => bail!(
            "Not enough points to profile {} with strips of width {}",
            args.input.display(),
            args.width
        ),
    }
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<()> {
    println!("scanprep v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    let defaults = PreprocessOptions::default();
    println!();
    println!("Defaults:");
    println!("  Sauvola k: {}", defaults.binarize.k);
    println!("  Binarization window: image width / {}", scanprep::util::AUTO_WINDOW_DIVISOR);
    println!("  Binarization type: {}", defaults.binarize.mode);
    println!(
        "  Horizontal wipe: window {}, threshold {}, min {}% ({})",
        defaults.horizontal.window_size,
        defaults.horizontal.threshold,
        defaults.horizontal.min_content_percent,
        defaults.horizontal.strategy
    );
    println!(
        "  Vertical wipe: window {}, threshold {}, min {}% ({})",
        defaults.vertical.window_size,
        defaults.vertical.threshold,
        defaults.vertical.min_content_percent,
        defaults.vertical.strategy
    );

    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        let status = if path.exists() { "found" } else { "not found" };
        println!("  {} ({})", path.display(), status);
    }

    Ok(())
}
