//! Compression artifact detection: 8x8 blockiness and an oversmoothing
//! proxy.

use serde::{Deserialize, Serialize};

use crate::analysis::sharpness::calculate_sharpness;
use crate::raster::Raster;

/// Scalar artifact scores, computed on the edited image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactScores {
    /// Blockiness score; 0 means no excess boundary discontinuity.
    pub compression: f64,
    /// Laplacian variance passthrough; LOWER values indicate MORE
    /// oversmoothing.
    pub oversmoothing: f64,
}

/// Estimate JPEG-style blockiness.
///
/// Compares the mean absolute intensity step across 8-pixel block boundaries
/// (columns/rows 7 vs 8 mod 8) against a baseline taken inside the blocks
/// (offsets 3 vs 4 mod 8), in both directions. The two excesses are summed
/// and floored at 0. The offsets assume unshifted 8x8 block alignment;
/// re-encoded or cropped images may under- or over-report.
///
/// Returns 0.0 when either dimension is below 9 pixels, where no complete
/// boundary sample exists.
#[must_use]
pub fn detect_compression_artifacts(raster: &Raster) -> f64 {
    let gray = raster.luma();
    let (w, h) = (gray.width(), gray.height());
    if w < 9 || h < 9 {
        return 0.0;
    }
    let buf = gray.buf();
    let at = |x: usize, y: usize| f64::from(buf[y * w + x]);

    // Mean |a - b| over column pairs (x, x+1) for x in start, start+8, ...
    let column_step = |start: usize, limit: usize| -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut x = start;
        while x < limit {
            for y in 0..h {
                sum += (at(x, y) - at(x + 1, y)).abs();
                count += 1;
            }
            x += 8;
        }
        sum / count as f64
    };
    let row_step = |start: usize, limit: usize| -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut y = start;
        while y < limit {
            for x in 0..w {
                sum += (at(x, y) - at(x, y + 1)).abs();
                count += 1;
            }
            y += 8;
        }
        sum / count as f64
    };

    let score_h = column_step(7, w - 1) - column_step(3, w - 5);
    let score_v = row_step(7, h - 1) - row_step(3, h - 5);
    (score_h + score_v).max(0.0)
}

/// Detect oversmoothing (loss of fine texture).
///
/// Raw passthrough of the Laplacian sharpness variance; low values mean the
/// image carries little high-frequency detail.
#[must_use]
pub fn detect_oversmoothing(raster: &Raster) -> f64 {
    calculate_sharpness(raster)
}

/// Run both artifact detectors on the edited image.
#[must_use]
pub fn analyze_artifacts(edited: &Raster) -> ArtifactScores {
    ArtifactScores {
        compression: detect_compression_artifacts(edited),
        oversmoothing: detect_oversmoothing(edited),
    }
}
