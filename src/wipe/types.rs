//! Common types for the wipe module

use serde::Serialize;
use thiserror::Error;

use crate::integral::IntegralError;

/// Wipe error types
#[derive(Debug, Error)]
pub enum WipeError {
    #[error("Integral table error: {0}")]
    Integral(#[from] IntegralError),
}

pub type Result<T> = std::result::Result<T, WipeError>;

/// Detected content span `[low, high)` along the scanned axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentEdges {
    /// First content column (row, for vertical scans)
    pub low: u32,
    /// One past the last content column
    pub high: u32,
}

impl ContentEdges {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// Width of the content span (0 if the edges crossed)
    pub fn span(&self) -> u32 {
        self.high.saturating_sub(self.low)
    }
}
