//! Integral image module
//!
//! Summed-area tables that answer "what is the sum, mean, spread or ink
//! share of this rectangle?" in constant time, however large the window.
//!
//! # Features
//!
//! - One table type for linear and squared sums ([`TableKind`] selects which)
//! - Border windows are clamped, never wrapped or padded
//! - [`WindowStats`] capability trait; binarization and edge finding only
//!   depend on this trait
//!
//! # Example
//!
//! ```rust
//! use image::{GrayImage, Luma};
//! use scanprep::integral::{IntegralTable, Window, WindowStats};
//!
//! let gray = GrayImage::from_pixel(100, 100, Luma([200]));
//! let table = IntegralTable::with_squares(&gray).unwrap();
//!
//! let stats = table.statistics(Window::centered(50, 50, 15)).unwrap();
//! assert_eq!(stats.mean, 200.0);
//! assert_eq!(stats.stddev, 0.0);
//! ```

mod stats;
mod table;
mod types;
mod window;

pub use stats::{Statistics, WindowStats, BACKGROUND, INK};
pub use table::{IntegralTable, TableKind};
pub use types::{IntegralError, Result};
pub use window::Window;
