//! Error types for edit-eval operations.

use thiserror::Error;

/// Result type alias for edit-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during edit analysis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Image dimensions don't match between original and edited images.
    ///
    /// All pairwise analyzers except [`crate::analysis::metrics::analyze_metrics`]
    /// require equal-sized operands; the caller is expected to resample
    /// before invocation.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height).
        expected: (usize, usize),
        /// Actual dimensions (width, height).
        actual: (usize, usize),
    },

    /// Pixel buffer length does not match the declared dimensions.
    #[error("Invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer {
        /// Expected buffer length in bytes.
        expected: usize,
        /// Actual buffer length in bytes.
        actual: usize,
    },

    /// Failed to rasterize a histogram plot.
    #[error("Chart render failed: {0}")]
    ChartRender(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
