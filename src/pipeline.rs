//! Pipeline processing module
//!
//! Ties binarization and margin wiping into one page preprocessing run,
//! separating the processing logic from CLI handling.
//!
//! ## Processing Steps
//!
//! 1. Decode the page and convert it to grayscale
//! 2. Build the sum and squared-sum integral tables
//! 3. Sauvola binarization
//! 4. Top/bottom margin wipe
//! 5. Left/right margin wipe
//! 6. Zero-inverse against the colour original (zeroinv mode only)
//!
//! Each step reports a [`ProcessingStage`]; steps 4 and 5 report one
//! `Wiping` stage and are skipped when wiping is off. Multi-level runs
//! build the integral tables once and repeat steps 3-6 for several k
//! values.

use image::{DynamicImage, GrayImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::binarize::{
    zero_inverse, BinarizeError, BinarizeMode, SauvolaBinarizer, SauvolaOptions,
};
use crate::integral::{IntegralError, IntegralTable};
use crate::progress::ProcessingStage;
use crate::util::{load_image, multi_output_path};
use crate::wipe::{EdgeOptions, MarginWiper, WipeError};

// ============================================================
// Constants
// ============================================================

/// k values of a multi-level run
pub const DEFAULT_MULTI_K: [f64; 4] = [0.1, 0.2, 0.4, 0.5];

/// Horizontal wipe threshold per unit of k in multi-level runs
pub const MULTI_THRESHOLD_FACTOR: f64 = 0.02;

// ============================================================
// Errors
// ============================================================

/// Pipeline processing error
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Binarization failed: {0}")]
    Binarize(#[from] BinarizeError),

    #[error("Wipe failed: {0}")]
    Wipe(#[from] WipeError),

    #[error("Integral table error: {0}")]
    Integral(#[from] IntegralError),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================
// Progress
// ============================================================

/// Progress callback for pipeline stages
///
/// Batch runs call this from several worker threads at once.
pub trait ProgressCallback: Send + Sync {
    /// Called when a file enters a new stage
    fn on_stage(&self, input: &Path, stage: ProcessingStage);
    /// Called after each file finishes, successfully or not
    fn on_file_complete(&self, completed: usize, total: usize);
}

/// No-op progress callback (silent mode)
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_stage(&self, _input: &Path, _stage: ProcessingStage) {}
    fn on_file_complete(&self, _completed: usize, _total: usize) {}
}

// ============================================================
// Options
// ============================================================

/// Preprocessing options
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    /// Binarization parameters
    pub binarize: SauvolaOptions,
    /// Run the margin wipes after binarizing
    pub wipe: bool,
    /// Left/right margin parameters
    pub horizontal: EdgeOptions,
    /// Top/bottom margin parameters
    pub vertical: EdgeOptions,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            binarize: SauvolaOptions::default(),
            wipe: true,
            horizontal: EdgeOptions::horizontal(),
            vertical: EdgeOptions::vertical(),
        }
    }
}

impl PreprocessOptions {
    /// Create a new options builder
    pub fn builder() -> PreprocessOptionsBuilder {
        PreprocessOptionsBuilder::default()
    }

    /// Binarize without wiping
    pub fn binarize_only() -> Self {
        Self {
            wipe: false,
            ..Default::default()
        }
    }

    /// Defaults tuned for very light text
    pub fn faint_text() -> Self {
        Self {
            binarize: SauvolaOptions::faint_text(),
            ..Default::default()
        }
    }
}

/// Builder for PreprocessOptions
#[derive(Debug, Default)]
pub struct PreprocessOptionsBuilder {
    options: PreprocessOptions,
}

impl PreprocessOptionsBuilder {
    /// Set binarization options
    #[must_use]
    pub fn binarize(mut self, options: SauvolaOptions) -> Self {
        self.options.binarize = options;
        self
    }

    /// Enable or disable wiping
    #[must_use]
    pub fn wipe(mut self, enabled: bool) -> Self {
        self.options.wipe = enabled;
        self
    }

    /// Set left/right margin options
    #[must_use]
    pub fn horizontal(mut self, options: EdgeOptions) -> Self {
        self.options.horizontal = options;
        self
    }

    /// Set top/bottom margin options
    #[must_use]
    pub fn vertical(mut self, options: EdgeOptions) -> Self {
        self.options.vertical = options;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> PreprocessOptions {
        self.options
    }
}

// ============================================================
// Results
// ============================================================

/// Summary of one processed input file
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub input: PathBuf,
    /// Files written, one per k value for multi-level runs
    pub outputs: Vec<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub elapsed_secs: f64,
}

/// One input/output pair of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl BatchJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

// ============================================================
// Preprocessor
// ============================================================

/// Page preprocessor
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    /// Create a new preprocessor
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    /// Get the options
    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Preprocess a decoded page
    ///
    /// Returns a grayscale image in binary mode and an RGBA image in
    /// zero-inverse mode.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &DynamicImage) -> Result<DynamicImage> {
        self.process_staged(image, &|_| {})
    }

    /// Preprocess a page once per k value, sharing one pair of integral tables
    ///
    /// The horizontal wipe threshold of each run is `k * 0.02`; the vertical
    /// wipe keeps its configured threshold.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), levels = ks.len()))]
    pub fn process_multi(&self, image: &DynamicImage, ks: &[f64]) -> Result<Vec<(f64, DynamicImage)>> {
        self.process_multi_staged(image, ks, &|_| {})
    }

    /// [`Preprocessor::process`] reporting each stage of `input` to `progress`
    pub fn process_reporting<P: ProgressCallback>(
        &self,
        image: &DynamicImage,
        input: &Path,
        progress: &P,
    ) -> Result<DynamicImage> {
        self.process_staged(image, &|stage| progress.on_stage(input, stage))
    }

    fn process_staged(
        &self,
        image: &DynamicImage,
        stage: &dyn Fn(ProcessingStage),
    ) -> Result<DynamicImage> {
        let gray = image.to_luma8();

        stage(ProcessingStage::Tabulating);
        let table = IntegralTable::with_squares(&gray)?;

        stage(ProcessingStage::Binarizing);
        let mask = SauvolaBinarizer::new(self.options.binarize.clone())
            .binarize_with_table(&table, &gray)?;

        let cleaned = self.clean(mask, &self.options.horizontal, stage)?;
        self.finish(cleaned, image)
    }

    fn process_multi_staged(
        &self,
        image: &DynamicImage,
        ks: &[f64],
        stage: &dyn Fn(ProcessingStage),
    ) -> Result<Vec<(f64, DynamicImage)>> {
        let gray = image.to_luma8();

        stage(ProcessingStage::Tabulating);
        let table = IntegralTable::with_squares(&gray)?;

        ks.iter()
            .map(|&k| {
                debug!(k, "Binarizing level");
                stage(ProcessingStage::Binarizing);
                let binarizer = SauvolaBinarizer::new(self.options.binarize.with_k(k));
                let mask = binarizer.binarize_with_table(&table, &gray)?;
                let horizontal = self
                    .options
                    .horizontal
                    .with_threshold(k * MULTI_THRESHOLD_FACTOR);
                let cleaned = self.clean(mask, &horizontal, stage)?;
                Ok((k, self.finish(cleaned, image)?))
            })
            .collect()
    }

    /// Preprocess one file and save the result as `output`
    pub fn process_file<P: ProgressCallback>(
        &self,
        input: &Path,
        output: &Path,
        progress: &P,
    ) -> Result<ProcessReport> {
        let start = Instant::now();
        let image = self.load(input, progress)?;

        let result = self.process_reporting(&image, input, progress)?;

        progress.on_stage(input, ProcessingStage::Saving);
        result.save(output)?;
        progress.on_stage(input, ProcessingStage::Completed);

        info!(input = %input.display(), output = %output.display(), "Page preprocessed");
        Ok(ProcessReport {
            input: input.to_path_buf(),
            outputs: vec![output.to_path_buf()],
            width: image.width(),
            height: image.height(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    /// Preprocess one file at several k values, saving `<base>_bin<k>.png` each
    pub fn process_multi_file<P: ProgressCallback>(
        &self,
        input: &Path,
        base: &Path,
        ks: &[f64],
        progress: &P,
    ) -> Result<ProcessReport> {
        let start = Instant::now();
        let image = self.load(input, progress)?;

        let levels =
            self.process_multi_staged(&image, ks, &|stage| progress.on_stage(input, stage))?;

        progress.on_stage(input, ProcessingStage::Saving);
        let mut outputs = Vec::with_capacity(levels.len());
        for (k, result) in levels {
            let path = multi_output_path(base, k);
            debug!(path = %path.display(), "Saving level");
            result.save(&path)?;
            outputs.push(path);
        }
        progress.on_stage(input, ProcessingStage::Completed);

        Ok(ProcessReport {
            input: input.to_path_buf(),
            outputs,
            width: image.width(),
            height: image.height(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    /// Preprocess many files in parallel
    ///
    /// Each job succeeds or fails on its own; results come back in job order.
    pub fn process_batch<P: ProgressCallback>(
        &self,
        jobs: &[BatchJob],
        progress: &P,
    ) -> Vec<Result<ProcessReport>> {
        let total = jobs.len();
        let completed = AtomicUsize::new(0);
        info!(total, "Starting batch");

        jobs.par_iter()
            .map(|job| {
                let result = self.process_file(&job.input, &job.output, progress);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress.on_file_complete(done, total);
                result
            })
            .collect()
    }

    fn load<P: ProgressCallback>(&self, input: &Path, progress: &P) -> Result<DynamicImage> {
        if !input.exists() {
            return Err(PipelineError::InputNotFound(input.to_path_buf()));
        }
        progress.on_stage(input, ProcessingStage::Loading);
        Ok(load_image(input)?)
    }

    /// Vertical then horizontal wipe, when enabled
    fn clean(
        &self,
        mask: GrayImage,
        horizontal: &EdgeOptions,
        stage: &dyn Fn(ProcessingStage),
    ) -> Result<GrayImage> {
        if !self.options.wipe {
            return Ok(mask);
        }
        stage(ProcessingStage::Wiping);
        Ok(MarginWiper::wipe_page(&mask, horizontal, &self.options.vertical)?)
    }

    fn finish(&self, mask: GrayImage, original: &DynamicImage) -> Result<DynamicImage> {
        match self.options.binarize.mode {
            BinarizeMode::Binary => Ok(DynamicImage::ImageLuma8(mask)),
            BinarizeMode::ZeroInverse => {
                let colour = zero_inverse(&mask, &original.to_rgba8())?;
                Ok(DynamicImage::ImageRgba8(colour))
            }
        }
    }
}
