//! Common types for the integral module

use thiserror::Error;

/// Integral table error types
#[derive(Debug, Error)]
pub enum IntegralError {
    #[error("Empty grid: {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, IntegralError>;
