//! Sharpness estimation via Laplacian response variance.

use serde::{Deserialize, Serialize};

use crate::raster::{PadMode, Raster, correlate3};
use crate::stats::variance;

const LAPLACIAN: [[f32; 3]; 3] = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

/// Scalar scores from pairwise sharpness comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharpnessScores {
    /// Laplacian variance of the original image.
    pub sharpness_original: f64,
    /// Laplacian variance of the edited image.
    pub sharpness_edited: f64,
    /// `sharpness_edited - sharpness_original`.
    pub sharpness_delta: f64,
}

/// Laplacian response variance over the whole grayscale image.
///
/// Higher variance indicates more high-frequency detail (a sharper image).
#[must_use]
pub fn calculate_sharpness(raster: &Raster) -> f64 {
    let gray = raster.luma();
    let response = correlate3(&gray, &LAPLACIAN, PadMode::Edge);
    variance(response.buf())
}

/// Compare the sharpness of an original/edited pair.
///
/// Sharpness is a single-image statistic, so no size precondition applies.
#[must_use]
pub fn analyze_sharpness(original: &Raster, edited: &Raster) -> SharpnessScores {
    let sharpness_original = calculate_sharpness(original);
    let sharpness_edited = calculate_sharpness(edited);
    SharpnessScores {
        sharpness_original,
        sharpness_edited,
        sharpness_delta: sharpness_edited - sharpness_original,
    }
}
