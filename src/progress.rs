//! Progress tracking module for page preprocessing.
//!
//! Processing stages, console verbosity modes and a per-file tracker for
//! sequential runs. Batch runs report through indicatif bars instead (see
//! [`crate::cli`]).

use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Processing stages of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStage {
    /// Initializing
    #[default]
    Initializing,
    /// Decoding the input image
    Loading,
    /// Building integral tables
    Tabulating,
    /// Sauvola thresholding
    Binarizing,
    /// Removing margins
    Wiping,
    /// Encoding the output image
    Saving,
    /// Completed
    Completed,
}

impl ProcessingStage {
    /// Get the name of the stage
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Initializing => "Initializing",
            ProcessingStage::Loading => "Loading",
            ProcessingStage::Tabulating => "Tabulating",
            ProcessingStage::Binarizing => "Binarizing",
            ProcessingStage::Wiping => "Wiping",
            ProcessingStage::Saving => "Saving",
            ProcessingStage::Completed => "Completed",
        }
    }

    /// Get a short description of the stage
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Initializing => "preparing",
            ProcessingStage::Loading => "decoding image",
            ProcessingStage::Tabulating => "building integral tables",
            ProcessingStage::Binarizing => "thresholding pixels",
            ProcessingStage::Wiping => "removing margins",
            ProcessingStage::Saving => "encoding output",
            ProcessingStage::Completed => "done",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.description())
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// Normal output (file headers and results)
    #[default]
    Normal,
    /// Verbose output (stage display)
    Verbose,
    /// Very verbose (stage display with timings)
    VeryVerbose,
}

impl OutputMode {
    fn rank(self) -> u8 {
        match self {
            OutputMode::Quiet => 0,
            OutputMode::Normal => 1,
            OutputMode::Verbose => 2,
            OutputMode::VeryVerbose => 3,
        }
    }

    /// Map `-v` occurrences to a mode
    pub fn from_verbosity(level: u8) -> Self {
        match level {
            0 => OutputMode::Normal,
            1 => OutputMode::Verbose,
            _ => OutputMode::VeryVerbose,
        }
    }

    /// Mode for `--quiet` and `-v`; quiet wins
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            OutputMode::Quiet
        } else {
            Self::from_verbosity(verbose)
        }
    }

    /// Whether a message of level `required` is printed in this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        *self != OutputMode::Quiet && self.rank() >= required.rank()
    }
}

/// Stage reporter for a single page run
///
/// Prints the page name, each stage in verbose mode, and the stage
/// timings in very verbose mode. Timings are kept whatever the mode.
#[derive(Debug)]
pub struct ProgressTracker {
    page: String,
    current_stage: ProcessingStage,
    timings: Vec<(ProcessingStage, Duration)>,
    page_start: Instant,
    stage_start: Instant,
    output_mode: OutputMode,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(OutputMode::Normal)
    }
}

impl ProgressTracker {
    pub fn new(output_mode: OutputMode) -> Self {
        let now = Instant::now();
        Self {
            page: String::new(),
            current_stage: ProcessingStage::Initializing,
            timings: Vec::new(),
            page_start: now,
            stage_start: now,
            output_mode,
        }
    }

    /// Begin a page, clearing the timings of the previous one
    pub fn start_page(&mut self, page: &str) {
        self.page = page.to_string();
        self.current_stage = ProcessingStage::Initializing;
        self.timings.clear();
        self.page_start = Instant::now();
        self.stage_start = self.page_start;

        if self.output_mode.should_show(OutputMode::Normal) {
            println!("{}", self.page);
        }
    }

    /// Close the running stage and enter `stage`
    pub fn set_stage(&mut self, stage: ProcessingStage) {
        self.close_stage();
        self.current_stage = stage;

        if self.output_mode.should_show(OutputMode::Verbose) {
            println!("  {}", stage);
            let _ = io::stdout().flush();
        }
    }

    /// Close the running stage and mark the page done
    pub fn complete_page(&mut self) {
        self.close_stage();
        self.current_stage = ProcessingStage::Completed;

        if self.output_mode.should_show(OutputMode::VeryVerbose) {
            for (stage, took) in &self.timings {
                println!("    {:<10} {:.3}s", stage.name(), took.as_secs_f64());
            }
        }
        if self.output_mode.should_show(OutputMode::Normal) {
            println!("  done in {:.2}s", self.elapsed_secs());
        }
    }

    fn close_stage(&mut self) {
        if self.current_stage != ProcessingStage::Initializing {
            self.timings
                .push((self.current_stage, self.stage_start.elapsed()));
        }
        self.stage_start = Instant::now();
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn current_stage(&self) -> ProcessingStage {
        self.current_stage
    }

    /// Finished stages of the current page, in order
    pub fn timings(&self) -> &[(ProcessingStage, Duration)] {
        &self.timings
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.page_start.elapsed().as_secs_f64()
    }

    /// One line tally of a batch run
    pub fn print_summary(succeeded: usize, failed: usize) {
        println!(
            "{} of {} pages preprocessed, {} failed",
            succeeded,
            succeeded + failed,
            failed
        );
    }
}
