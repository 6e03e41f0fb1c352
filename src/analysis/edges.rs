//! Edge analysis: Sobel gradient maps, edge density, and edge preservation.

use imgref::ImgVec;
use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::raster::{
    GrayImage, PadMode, Raster, RgbImage, ScalarField, correlate3, ensure_same_size,
    normalize_to_u8,
};
use crate::stats::pearson;

/// Horizontal Sobel kernel (applied as a correlation).
const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// Vertical Sobel kernel.
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Discrete Laplacian kernel.
const LAPLACIAN: [[f32; 3]; 3] = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

/// Display intensity above which a normalized gradient pixel counts as an
/// edge (roughly 30% of full scale).
const DENSITY_THRESHOLD: u8 = 80;

/// Minimum raw magnitude delta for the difference map; smaller deltas are
/// treated as noise and left black.
const DIFF_THRESHOLD: f32 = 20.0;

/// Output of Sobel edge detection on a single raster.
#[derive(Debug, Clone)]
pub struct SobelEdges {
    /// Gradient magnitude normalized to 0-255 for display.
    pub edge_map: GrayImage,
    /// Fraction of normalized pixels above the edge threshold, in `[0, 1]`.
    pub density: f64,
    /// Raw (unnormalized) gradient magnitude field.
    pub magnitude: ScalarField,
}

/// Scalar scores from pairwise edge analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeScores {
    /// Edge density of the original image.
    pub density_original: f64,
    /// Edge density of the edited image.
    pub density_edited: f64,
    /// `density_edited - density_original`.
    pub density_delta: f64,
    /// Pearson correlation between the raw magnitude fields; 0.0 when either
    /// field is textureless (zero variance).
    pub preservation_score: f64,
}

/// Full pairwise edge analysis: per-image edge maps, a colored difference
/// map, and scalar scores.
#[derive(Debug, Clone)]
pub struct EdgeAnalysis {
    /// Normalized edge map of the original image.
    pub original_edges: GrayImage,
    /// Normalized edge map of the edited image.
    pub edited_edges: GrayImage,
    /// Green = edges gained, red = edges lost, black = unchanged.
    pub difference_map: RgbImage,
    /// Scalar scores.
    pub scores: EdgeScores,
}

/// Apply Sobel edge detection.
///
/// Converts to grayscale, pads the border by edge replication, correlates
/// with the two Sobel kernels, and takes `sqrt(Gx^2 + Gy^2)` per pixel.
#[must_use]
pub fn sobel_edge_detection(raster: &Raster) -> SobelEdges {
    let gray = raster.luma();
    let gx = correlate3(&gray, &SOBEL_X, PadMode::Edge);
    let gy = correlate3(&gray, &SOBEL_Y, PadMode::Edge);

    let magnitude_buf: Vec<f32> = gx
        .buf()
        .iter()
        .zip(gy.buf().iter())
        .map(|(&x, &y)| (x * x + y * y).sqrt())
        .collect();
    let magnitude = ImgVec::new(magnitude_buf, gray.width(), gray.height());

    let edge_map = normalize_to_u8(&magnitude);
    let above = edge_map.buf().iter().filter(|&&v| v > DENSITY_THRESHOLD).count();
    let density = above as f64 / edge_map.buf().len() as f64;

    SobelEdges {
        edge_map,
        density,
        magnitude,
    }
}

/// Laplacian edge detection, normalized for display.
///
/// Auxiliary sharpening diagnostic; not part of the primary edge pipeline.
#[must_use]
pub fn laplacian_edge_detection(raster: &Raster) -> GrayImage {
    let gray = raster.luma();
    let lap = correlate3(&gray, &LAPLACIAN, PadMode::Edge);
    let abs_buf: Vec<f32> = lap.buf().iter().map(|v| v.abs()).collect();
    normalize_to_u8(&ImgVec::new(abs_buf, lap.width(), lap.height()))
}

/// Perform full pairwise edge analysis.
///
/// # Errors
///
/// Returns [`crate::Error::DimensionMismatch`] when the rasters differ in
/// size; the caller must resample beforehand.
pub fn analyze_edges(original: &Raster, edited: &Raster) -> Result<EdgeAnalysis> {
    ensure_same_size(original, edited)?;

    let orig = sobel_edge_detection(original);
    let edit = sobel_edge_detection(edited);

    let (w, h) = (orig.magnitude.width(), orig.magnitude.height());
    let mut diff_buf = vec![RGB8::new(0, 0, 0); w * h];
    for (i, (&o, &e)) in orig
        .magnitude
        .buf()
        .iter()
        .zip(edit.magnitude.buf().iter())
        .enumerate()
    {
        let diff = e - o;
        if diff > DIFF_THRESHOLD {
            diff_buf[i].g = diff.clamp(0.0, 255.0) as u8;
        } else if diff < -DIFF_THRESHOLD {
            diff_buf[i].r = (-diff).clamp(0.0, 255.0) as u8;
        }
    }

    let preservation_score =
        pearson(orig.magnitude.buf(), edit.magnitude.buf()).unwrap_or(0.0);

    Ok(EdgeAnalysis {
        difference_map: ImgVec::new(diff_buf, w, h),
        scores: EdgeScores {
            density_original: orig.density,
            density_edited: edit.density,
            density_delta: edit.density - orig.density,
            preservation_score,
        },
        original_edges: orig.edge_map,
        edited_edges: edit.edge_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Vertical step edge: left half dark, right half bright.
    fn step_raster(w: usize, h: usize) -> Raster {
        let mut data = Vec::with_capacity(w * h * 3);
        for _y in 0..h {
            for x in 0..w {
                let v = if x < w / 2 { 10 } else { 240 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Raster::from_rgb8(&data, w, h).unwrap()
    }

    #[test]
    fn test_sobel_solid_image_has_no_edges() {
        let raster = Raster::solid(16, 16, RGB8::new(90, 90, 90));
        let edges = sobel_edge_detection(&raster);
        assert_eq!(edges.density, 0.0);
        assert!(edges.magnitude.buf().iter().all(|&v| v == 0.0));
        assert!(edges.edge_map.buf().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_sobel_step_edge_detected() {
        let edges = sobel_edge_detection(&step_raster(16, 16));
        assert!(edges.density > 0.0);
        assert!(edges.density < 1.0);
        let peak = edges.magnitude.buf().iter().cloned().fold(0.0f32, f32::max);
        assert!(peak > 0.0);
    }

    #[test]
    fn test_preservation_of_identical_images() {
        let raster = step_raster(16, 16);
        let analysis = analyze_edges(&raster, &raster).unwrap();
        assert!((analysis.scores.preservation_score - 1.0).abs() < 1e-9);
        assert_eq!(analysis.scores.density_delta, 0.0);
        // No significant magnitude delta, so the map stays black.
        assert!(
            analysis
                .difference_map
                .buf()
                .iter()
                .all(|p| p.r == 0 && p.g == 0 && p.b == 0)
        );
    }

    #[test]
    fn test_preservation_degenerate_is_zero() {
        let flat = Raster::solid(16, 16, RGB8::new(50, 50, 50));
        let textured = step_raster(16, 16);
        let analysis = analyze_edges(&flat, &textured).unwrap();
        assert_eq!(analysis.scores.preservation_score, 0.0);
    }

    #[test]
    fn test_difference_map_marks_gained_edges_green() {
        let flat = Raster::solid(16, 16, RGB8::new(50, 50, 50));
        let textured = step_raster(16, 16);
        let analysis = analyze_edges(&flat, &textured).unwrap();
        assert!(analysis.difference_map.buf().iter().any(|p| p.g > 0));
        assert!(analysis.difference_map.buf().iter().all(|p| p.r == 0));
    }

    #[test]
    fn test_difference_map_marks_lost_edges_red() {
        let flat = Raster::solid(16, 16, RGB8::new(50, 50, 50));
        let textured = step_raster(16, 16);
        let analysis = analyze_edges(&textured, &flat).unwrap();
        assert!(analysis.difference_map.buf().iter().any(|p| p.r > 0));
        assert!(analysis.difference_map.buf().iter().all(|p| p.g == 0));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let a = Raster::solid(8, 8, RGB8::new(0, 0, 0));
        let b = Raster::solid(8, 9, RGB8::new(0, 0, 0));
        assert!(matches!(
            analyze_edges(&a, &b),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_laplacian_output_dimensions() {
        let raster = step_raster(12, 9);
        let lap = laplacian_edge_detection(&raster);
        assert_eq!(lap.width(), 12);
        assert_eq!(lap.height(), 9);
    }
}
