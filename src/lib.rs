//! scanprep - Binarization and margin removal for scanned pages
//!
//! Prepares page scans for text recognition: converts grayscale scans into
//! clean two-level images and blanks the low-ink margins around the text.
//!
//! # Features
//!
//! - **Integral tables** ([`integral`]) - Constant-time window sums, means,
//!   standard deviations and ink proportions
//! - **Sauvola binarization** ([`binarize`]) - Adaptive local thresholding,
//!   with zero-inverse output that keeps the original colour under ink
//! - **Margin wiping** ([`wipe`]) - Content edge detection over ink
//!   proportion strips and fail-safe margin removal
//! - **Pipeline** ([`pipeline`]) - Binarize and wipe single pages, several k
//!   levels at once, or whole batches in parallel
//!
//! # Quick Start
//!
//! ```rust
//! use image::{DynamicImage, GrayImage, Luma};
//! use scanprep::{PreprocessOptions, Preprocessor, SauvolaOptions};
//!
//! let page = GrayImage::from_pixel(240, 320, Luma([225]));
//!
//! let options = PreprocessOptions::builder()
//!     .binarize(SauvolaOptions::builder().k(0.3).build())
//!     .build();
//! let clean = Preprocessor::new(options)
//!     .process(&DynamicImage::ImageLuma8(page))
//!     .unwrap();
//! assert_eq!(clean.width(), 240);
//! ```
//!
//! ## Using Builder Patterns
//!
//! All option structs support fluent builder patterns and presets:
//!
//! ```rust
//! use scanprep::{EdgeOptions, EdgeStrategy, SauvolaOptions};
//!
//! let faint = SauvolaOptions::faint_text();
//! let sauvola = SauvolaOptions::builder().k(0.2).window_size(41).build();
//!
//! let top_bottom = EdgeOptions::vertical();
//! let custom = EdgeOptions::builder()
//!     .window_size(9)
//!     .threshold(0.03)
//!     .strategy(EdgeStrategy::OutsideIn)
//!     .build();
//! ```
//!
//! # Architecture
//!
//! ```text
//! Grid -> IntegralTable -> WindowStats -> SauvolaBinarizer -> binary Grid
//!                                     \
//!                                      -> EdgeFinder -> MarginWiper -> wiped Grid
//! ```
//!
//! # License
//!
//! GPL-3.0

pub mod binarize;
pub mod cli;
pub mod config;
pub mod integral;
pub mod orientation;
pub mod pipeline;
pub mod progress;
pub mod util;
pub mod wipe;

// Re-exports for convenience
pub use binarize::{
    zero_inverse, BinarizeError, BinarizeMode, SauvolaBinarizer, SauvolaOptions,
    SauvolaOptionsBuilder,
};
pub use cli::{create_progress_bar, BarProgress, Cli, Commands, ExitCode};
pub use config::{CliOverrides, Config, ConfigError};
pub use integral::{IntegralError, IntegralTable, Statistics, TableKind, Window, WindowStats};
pub use orientation::transpose;
pub use pipeline::{
    BatchJob, PipelineError, PreprocessOptions, PreprocessOptionsBuilder, Preprocessor,
    ProcessReport, ProgressCallback, SilentProgress,
};
pub use progress::{OutputMode, ProcessingStage, ProgressTracker};
pub use wipe::{
    ContentEdges, EdgeFinder, EdgeOptions, EdgeOptionsBuilder, EdgeStrategy, MarginWiper,
    ProportionProfile, WipeError, WipeOutcome,
};

/// Exit codes for CLI
///
/// Integer forms of the [`ExitCode`] enum.
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const OUTPUT_ERROR: i32 = ExitCode::OutputError as i32;
    pub const PROCESSING_ERROR: i32 = ExitCode::ProcessingError as i32;
}
