//! Global image-fidelity metrics: MSE, PSNR, SNR, entropy, and a simplified
//! SSIM.
//!
//! The SSIM here is a deliberate, documented simplification: it is computed
//! ONCE over the whole grayscale image (global means/variances/covariance)
//! rather than per-window as in Wang et al. (2004). It trades spatial
//! sensitivity for simplicity and is not comparable to windowed SSIM values
//! from the reference literature.

use serde::{Deserialize, Serialize};

use crate::raster::Raster;
use crate::stats::{mean, std_dev, variance};

const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Scalar fidelity metrics for an original/edited pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean squared error over all channels.
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB; infinite for identical images.
    pub psnr: f64,
    /// Simplified global SSIM (see module docs).
    pub ssim: f64,
    /// Signal-to-noise ratio of the original image in dB.
    pub snr_original: f64,
    /// Signal-to-noise ratio of the edited image in dB.
    pub snr_edited: f64,
    /// Shannon entropy (bits) of the original image's grayscale histogram.
    pub entropy_original: f64,
    /// Shannon entropy (bits) of the edited image's grayscale histogram.
    pub entropy_edited: f64,
}

/// Mean squared per-pixel difference over all channels.
///
/// Operands must have equal dimensions; [`analyze_metrics`] resizes for you.
#[must_use]
pub fn calculate_mse(a: &Raster, b: &Raster) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for (x, y) in a.samples().zip(b.samples()) {
        let d = f64::from(x) - f64::from(y);
        sum += d * d;
        count += 1;
    }
    sum / count as f64
}

/// Peak signal-to-noise ratio, `20 * log10(255 / sqrt(MSE))`.
///
/// Returns `f64::INFINITY` when the images are identical (MSE == 0).
#[must_use]
pub fn calculate_psnr(a: &Raster, b: &Raster) -> f64 {
    let mse = calculate_mse(a, b);
    if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (255.0 / mse.sqrt()).log10()
    }
}

/// Signal-to-noise ratio of a single raster, `20 * log10(mean / std)` over
/// the raw channel values.
///
/// Returns `f64::INFINITY` for a zero-deviation (solid color) image.
#[must_use]
pub fn calculate_snr(raster: &Raster) -> f64 {
    let values: Vec<f32> = raster.samples().collect();
    let std = std_dev(&values);
    if std == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (mean(&values) / std).log10()
    }
}

/// Shannon entropy (base 2) of the grayscale intensity histogram.
///
/// Zero-probability bins are skipped; a solid-color image has entropy 0 and
/// any 8-bit image is bounded by 8 bits.
#[must_use]
pub fn calculate_entropy(raster: &Raster) -> f64 {
    let gray = raster.luma();
    let mut bins = [0u64; 256];
    for &v in gray.buf() {
        bins[v as usize] += 1;
    }
    let total = gray.buf().len() as f64;
    bins.iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Simplified global structural similarity index over grayscale intensities.
///
/// Operands must have equal dimensions; [`analyze_metrics`] resizes for you.
#[must_use]
pub fn calculate_ssim(a: &Raster, b: &Raster) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let ga = a.luma();
    let gb = b.luma();

    let mu1 = mean(ga.buf());
    let mu2 = mean(gb.buf());
    let sigma1_sq = variance(ga.buf());
    let sigma2_sq = variance(gb.buf());
    let sigma12 = ga
        .buf()
        .iter()
        .zip(gb.buf().iter())
        .map(|(&x, &y)| (f64::from(x) - mu1) * (f64::from(y) - mu2))
        .sum::<f64>()
        / ga.buf().len() as f64;

    let num = (2.0 * mu1 * mu2 + C1) * (2.0 * sigma12 + C2);
    let den = (mu1 * mu1 + mu2 * mu2 + C1) * (sigma1_sq + sigma2_sq + C2);
    num / den
}

/// Run all fidelity metrics on an original/edited pair.
///
/// This is the only analyzer permitted to resize internally: a mismatched
/// edited operand is bilinearly resized to the original's dimensions for the
/// pairwise metrics. The edited image's own SNR and entropy are computed on
/// the un-resized operand.
#[must_use]
pub fn analyze_metrics(original: &Raster, edited: &Raster) -> QualityMetrics {
    let resized;
    let aligned: &Raster = if original.dimensions() == edited.dimensions() {
        edited
    } else {
        resized = edited.resize(original.width(), original.height());
        &resized
    };

    QualityMetrics {
        mse: calculate_mse(original, aligned),
        psnr: calculate_psnr(original, aligned),
        ssim: calculate_ssim(original, aligned),
        snr_original: calculate_snr(original),
        snr_edited: calculate_snr(edited),
        entropy_original: calculate_entropy(original),
        entropy_edited: calculate_entropy(edited),
    }
}
