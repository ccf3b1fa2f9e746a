//! Common types for the binarize module

use thiserror::Error;

use crate::integral::IntegralError;

/// Binarization error types
#[derive(Debug, Error)]
pub enum BinarizeError {
    #[error("Dimension mismatch: mask is {mask:?}, original is {original:?}")]
    DimensionMismatch {
        mask: (u32, u32),
        original: (u32, u32),
    },

    #[error("Statistics source has no squared sums")]
    MissingSquaredSums,

    #[error("Integral table error: {0}")]
    Integral(#[from] IntegralError),
}

pub type Result<T> = std::result::Result<T, BinarizeError>;
