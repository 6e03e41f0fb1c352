//! Noise analysis: local-variance maps, heatmaps, and Gaussian sigma
//! estimation (Immerkaer's method).

use imgref::ImgVec;
use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::raster::{
    GrayImage, PadMode, Raster, RgbImage, ScalarField, correlate3, ensure_same_size,
    normalize_to_u8, pad1,
};
use crate::stats::std_dev;

/// Second-difference kernel robust to image structure.
const IMMERKAER: [[f32; 3]; 3] = [[1.0, -2.0, 1.0], [-2.0, 4.0, -2.0], [1.0, -2.0, 1.0]];

/// Minimum raw variance delta for the difference map.
const DIFF_THRESHOLD: f32 = 5.0;

/// Output of local-variance estimation on a single raster.
#[derive(Debug, Clone)]
pub struct LocalVariance {
    /// Variance field normalized to 0-255 for display.
    pub variance_map: GrayImage,
    /// Blue = quiet regions, yellow = noisy regions.
    pub heatmap: RgbImage,
    /// Global mean of the variance field; the scalar noise score.
    pub mean_variance: f64,
    /// Raw per-pixel local variance field.
    pub field: ScalarField,
}

/// Scalar scores from pairwise noise analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseScores {
    /// Mean local variance of the original image.
    pub noise_original: f64,
    /// Mean local variance of the edited image.
    pub noise_edited: f64,
    /// `noise_edited - noise_original`.
    pub noise_delta: f64,
    /// Estimated Gaussian noise sigma of the original image.
    pub gaussian_sigma_original: f64,
    /// Estimated Gaussian noise sigma of the edited image.
    pub gaussian_sigma_edited: f64,
}

/// Full pairwise noise analysis.
#[derive(Debug, Clone)]
pub struct NoiseAnalysis {
    /// Normalized variance map of the original image.
    pub original_map: GrayImage,
    /// Normalized variance map of the edited image.
    pub edited_map: GrayImage,
    /// Heatmap of the original image.
    pub original_heatmap: RgbImage,
    /// Heatmap of the edited image.
    pub edited_heatmap: RgbImage,
    /// Green = noise increased, red = noise decreased, black = unchanged.
    pub difference_map: RgbImage,
    /// Scalar scores.
    pub scores: NoiseScores,
}

/// Compute the 3x3 local variance of every pixel.
///
/// The grayscale field is reflect-padded by one pixel; each output pixel is
/// the population variance of its 9-sample neighborhood (itself included).
#[must_use]
pub fn calculate_local_variance(raster: &Raster) -> LocalVariance {
    let gray = raster.luma();
    let (w, h) = (gray.width(), gray.height());
    let padded = pad1(&gray, PadMode::Reflect);
    let pbuf = padded.buf();
    let pw = w + 2;

    let mut field_buf = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            let mut sum_sq = 0.0f32;
            for dy in 0..3 {
                for dx in 0..3 {
                    let v = pbuf[(y + dy) * pw + (x + dx)];
                    sum += v;
                    sum_sq += v * v;
                }
            }
            let mean = sum / 9.0;
            field_buf.push((sum_sq / 9.0 - mean * mean).max(0.0));
        }
    }
    let field = ImgVec::new(field_buf, w, h);

    let mean_variance =
        field.buf().iter().map(|&v| f64::from(v)).sum::<f64>() / field.buf().len() as f64;

    let variance_map = normalize_to_u8(&field);
    let heat_buf: Vec<RGB8> = variance_map
        .buf()
        .iter()
        .map(|&v| RGB8::new(v, v, 255 - v))
        .collect();

    LocalVariance {
        heatmap: ImgVec::new(heat_buf, w, h),
        mean_variance,
        variance_map,
        field,
    }
}

/// Estimate the standard deviation of Gaussian noise.
///
/// Correlates the edge-padded grayscale field with a second-difference
/// kernel and divides the response deviation by 6, which de-biases the
/// estimator under a Gaussian noise model. Returns 0.0 when either
/// dimension is smaller than the kernel.
#[must_use]
pub fn estimate_gaussian_noise(raster: &Raster) -> f64 {
    if raster.width() < 3 || raster.height() < 3 {
        return 0.0;
    }
    let gray = raster.luma();
    let response = correlate3(&gray, &IMMERKAER, PadMode::Edge);
    std_dev(response.buf()) / 6.0
}

/// Perform full pairwise noise analysis.
///
/// # Errors
///
/// Returns [`crate::Error::DimensionMismatch`] when the rasters differ in
/// size.
pub fn analyze_noise(original: &Raster, edited: &Raster) -> Result<NoiseAnalysis> {
    ensure_same_size(original, edited)?;

    let orig = calculate_local_variance(original);
    let edit = calculate_local_variance(edited);

    let (w, h) = (orig.field.width(), orig.field.height());
    let mut diff_buf = vec![RGB8::new(0, 0, 0); w * h];
    for (i, (&o, &e)) in orig.field.buf().iter().zip(edit.field.buf().iter()).enumerate() {
        let diff = e - o;
        if diff > DIFF_THRESHOLD {
            diff_buf[i].g = 255;
        } else if diff < -DIFF_THRESHOLD {
            diff_buf[i].r = 255;
        }
    }

    Ok(NoiseAnalysis {
        difference_map: ImgVec::new(diff_buf, w, h),
        scores: NoiseScores {
            noise_original: orig.mean_variance,
            noise_edited: edit.mean_variance,
            noise_delta: edit.mean_variance - orig.mean_variance,
            gaussian_sigma_original: estimate_gaussian_noise(original),
            gaussian_sigma_edited: estimate_gaussian_noise(edited),
        },
        original_map: orig.variance_map,
        edited_map: edit.variance_map,
        original_heatmap: orig.heatmap,
        edited_heatmap: edit.heatmap,
    })
}
