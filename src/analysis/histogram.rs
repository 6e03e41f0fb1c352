//! Histogram analysis: per-channel histograms, brightness/contrast deltas,
//! and aligned histogram plots.

use serde::{Deserialize, Serialize};

use crate::chart::{plot_svg, render_plot, shared_y_max, smooth_histogram, stack_vertical};
use crate::error::Result;
use crate::raster::{Raster, RgbImage, ensure_same_size};
use crate::stats::{mean, std_dev};

/// Per-channel intensity histogram: 256 bins for each of R, G, B.
#[derive(Debug, Clone)]
pub struct ChannelHistogram {
    /// `bins[channel][intensity]` counts.
    pub bins: [[u32; 256]; 3],
}

impl ChannelHistogram {
    /// Count per-channel intensities of a raster.
    #[must_use]
    pub fn from_raster(raster: &Raster) -> Self {
        let mut bins = [[0u32; 256]; 3];
        for p in raster.pixels().pixels() {
            bins[0][p.r as usize] += 1;
            bins[1][p.g as usize] += 1;
            bins[2][p.b as usize] += 1;
        }
        Self { bins }
    }

    /// Sum of absolute per-bin differences across all three channels.
    #[must_use]
    pub fn absolute_difference(&self, other: &Self) -> u64 {
        self.bins
            .iter()
            .zip(other.bins.iter())
            .flat_map(|(a, b)| a.iter().zip(b.iter()))
            .map(|(&x, &y)| u64::from(x.abs_diff(y)))
            .sum()
    }
}

/// Histogram plus global tone statistics for a single raster.
#[derive(Debug, Clone)]
pub struct HistogramStats {
    /// Per-channel histogram.
    pub histogram: ChannelHistogram,
    /// Mean of all channel values.
    pub brightness: f64,
    /// Population standard deviation of all channel values.
    pub contrast: f64,
}

/// Scalar tone scores from pairwise histogram analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneScores {
    /// `brightness_edited - brightness_original`.
    pub brightness_delta: f64,
    /// `contrast_edited - contrast_original`.
    pub contrast_delta: f64,
    /// Normalized tonal redistribution as a percentage:
    /// `sum(|bin diffs|) / (pixels * 3) * 100`, independent of image size.
    pub histogram_delta_score: f64,
}

/// Rendered histogram plots, all sharing one Y-axis scale.
#[derive(Debug, Clone)]
pub struct HistogramPlots {
    /// Smoothed histogram of the original image.
    pub original: RgbImage,
    /// Smoothed histogram of the edited image.
    pub edited: RgbImage,
    /// Difference plot (edited minus original), centered X axis.
    pub difference: RgbImage,
    /// The three plots stacked vertically for export.
    pub combined: RgbImage,
}

/// Full pairwise histogram analysis.
#[derive(Debug, Clone)]
pub struct HistogramAnalysis {
    /// Histogram and tone stats of the original image.
    pub original: HistogramStats,
    /// Histogram and tone stats of the edited image.
    pub edited: HistogramStats,
    /// Scalar scores.
    pub scores: ToneScores,
    /// Rendered plots; `None` when plot rendering was skipped.
    pub plots: Option<HistogramPlots>,
}

/// Compute histogram, brightness (mean), and contrast (standard deviation)
/// over all channels and pixels.
#[must_use]
pub fn calculate_histogram_stats(raster: &Raster) -> HistogramStats {
    let values: Vec<f32> = raster.samples().collect();
    HistogramStats {
        histogram: ChannelHistogram::from_raster(raster),
        brightness: mean(&values),
        contrast: std_dev(&values),
    }
}

/// Perform full pairwise histogram analysis.
///
/// The scalar scores are always computed; plot rendering is optional so a
/// caller can skip the expensive rasterization without losing the tone
/// statistics.
///
/// # Errors
///
/// Returns [`crate::Error::DimensionMismatch`] for unequal operands, or
/// [`crate::Error::ChartRender`] if plot rasterization fails.
pub fn analyze_histogram(
    original: &Raster,
    edited: &Raster,
    render_plots: bool,
) -> Result<HistogramAnalysis> {
    ensure_same_size(original, edited)?;

    let orig = calculate_histogram_stats(original);
    let edit = calculate_histogram_stats(edited);

    let total_pixels = (original.width() * original.height()) as f64;
    let diff = orig.histogram.absolute_difference(&edit.histogram);
    let histogram_delta_score = diff as f64 / (total_pixels * 3.0) * 100.0;

    let plots = render_plots
        .then(|| render_histogram_plots(&orig.histogram, &edit.histogram))
        .transpose()?;

    Ok(HistogramAnalysis {
        scores: ToneScores {
            brightness_delta: edit.brightness - orig.brightness,
            contrast_delta: edit.contrast - orig.contrast,
            histogram_delta_score,
        },
        original: orig,
        edited: edit,
        plots,
    })
}

/// Render the three aligned plots (original, edited, difference) plus the
/// combined vertical export image.
///
/// Each channel is smoothed with a centered window-3 moving average before
/// plotting; all three plots share a global Y maximum so their scales are
/// directly comparable.
///
/// # Errors
///
/// Returns [`crate::Error::ChartRender`] if SVG rasterization fails.
pub fn render_histogram_plots(
    original: &ChannelHistogram,
    edited: &ChannelHistogram,
) -> Result<HistogramPlots> {
    let smooth = |h: &ChannelHistogram| -> [[f64; 256]; 3] {
        [
            smooth_histogram(&h.bins[0]),
            smooth_histogram(&h.bins[1]),
            smooth_histogram(&h.bins[2]),
        ]
    };
    let orig_smooth = smooth(original);
    let edit_smooth = smooth(edited);

    let mut diff = [[0.0f64; 256]; 3];
    for ch in 0..3 {
        for x in 0..256 {
            diff[ch][x] = edit_smooth[ch][x] - orig_smooth[ch][x];
        }
    }

    let y_max = shared_y_max(&orig_smooth, &edit_smooth, &diff);

    let original_plot = render_plot(&plot_svg(&orig_smooth, "Original", y_max, false))?;
    let edited_plot = render_plot(&plot_svg(&edit_smooth, "Edited", y_max, false))?;
    let difference_plot = render_plot(&plot_svg(&diff, "Difference (E - O)", y_max, true))?;

    let combined = stack_vertical(&[&original_plot, &edited_plot, &difference_plot]);

    Ok(HistogramPlots {
        original: original_plot,
        edited: edited_plot,
        difference: difference_plot,
        combined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{PLOT_HEIGHT, PLOT_WIDTH};
    use rgb::RGB8;

    #[test]
    fn test_histogram_counts() {
        let raster = Raster::solid(10, 10, RGB8::new(255, 0, 0));
        let hist = ChannelHistogram::from_raster(&raster);
        assert_eq!(hist.bins[0][255], 100);
        assert_eq!(hist.bins[1][0], 100);
        assert_eq!(hist.bins[2][0], 100);
    }

    #[test]
    fn test_brightness_and_contrast_of_solid() {
        let stats = calculate_histogram_stats(&Raster::solid(8, 8, RGB8::new(60, 60, 60)));
        assert!((stats.brightness - 60.0).abs() < 1e-9);
        assert_eq!(stats.contrast, 0.0);
    }

    #[test]
    fn test_identical_images_zero_delta() {
        let raster = Raster::solid(10, 10, RGB8::new(120, 40, 200));
        let analysis = analyze_histogram(&raster, &raster, true).unwrap();
        assert_eq!(analysis.scores.histogram_delta_score, 0.0);
        assert_eq!(analysis.scores.brightness_delta, 0.0);
        assert_eq!(analysis.scores.contrast_delta, 0.0);
    }

    #[test]
    fn test_red_vs_blue_delta_score() {
        // All mass moves between bin 255 and bin 0 in both the R and B
        // channels: 4N absolute difference over 3N samples = 133.33%.
        let red = Raster::solid(10, 10, RGB8::new(255, 0, 0));
        let blue = Raster::solid(10, 10, RGB8::new(0, 0, 255));
        let analysis = analyze_histogram(&red, &blue, false).unwrap();
        assert!((analysis.scores.histogram_delta_score - 400.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_brightness_delta_sign() {
        let dark = Raster::solid(10, 10, RGB8::new(30, 30, 30));
        let bright = Raster::solid(10, 10, RGB8::new(200, 200, 200));
        let analysis = analyze_histogram(&dark, &bright, false).unwrap();
        assert!((analysis.scores.brightness_delta - 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let a = Raster::solid(10, 10, RGB8::new(0, 0, 0));
        let b = Raster::solid(10, 11, RGB8::new(0, 0, 0));
        assert!(analyze_histogram(&a, &b, false).is_err());
    }

    #[test]
    fn test_plots_have_expected_dimensions() {
        let a = Raster::solid(10, 10, RGB8::new(10, 50, 90));
        let b = Raster::solid(10, 10, RGB8::new(90, 50, 10));
        let analysis = analyze_histogram(&a, &b, true).unwrap();
        let plots = analysis.plots.unwrap();
        assert_eq!(plots.original.width(), PLOT_WIDTH as usize);
        assert_eq!(plots.original.height(), PLOT_HEIGHT as usize);
        assert_eq!(plots.combined.height(), 3 * PLOT_HEIGHT as usize);
    }

    #[test]
    fn test_skipping_plots_keeps_scores() {
        let dark = Raster::solid(10, 10, RGB8::new(30, 30, 30));
        let bright = Raster::solid(10, 10, RGB8::new(200, 200, 200));
        let analysis = analyze_histogram(&dark, &bright, false).unwrap();
        assert!(analysis.plots.is_none());
        assert!((analysis.scores.brightness_delta - 170.0).abs() < 1e-9);
        assert!(analysis.scores.histogram_delta_score > 0.0);
    }
}
