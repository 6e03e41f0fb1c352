//! Pairwise analyzers and the aggregate "run analysis" entry point.
//!
//! Each analyzer is a stateless pure function over two equal-sized rasters
//! (the metrics analyzer alone resizes internally). They share no buffers
//! and never mutate their inputs, so [`run_analysis`] executes them
//! concurrently.

pub mod artifacts;
pub mod edges;
pub mod histogram;
pub mod metrics;
pub mod noise;
pub mod report;
pub mod sharpness;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::raster::{Raster, ensure_same_size};

use artifacts::ArtifactScores;
use edges::{EdgeAnalysis, EdgeScores};
use histogram::{HistogramAnalysis, ToneScores};
use metrics::QualityMetrics;
use noise::{NoiseAnalysis, NoiseScores};
use report::ReportInput;
use sharpness::SharpnessScores;

/// Configuration for which analyzers to run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Run edge analysis (Sobel maps, density, preservation).
    pub edges: bool,
    /// Run noise analysis (local variance, Gaussian sigma).
    pub noise: bool,
    /// Run histogram analysis (tone deltas, rendered plots).
    pub histogram: bool,
    /// Render the histogram plots; when false the histogram analyzer still
    /// produces its scalar scores.
    pub histogram_plots: bool,
    /// Run fidelity metrics (MSE, PSNR, SSIM, SNR, entropy).
    pub metrics: bool,
    /// Run sharpness comparison.
    pub sharpness: bool,
    /// Run artifact detectors on the edited image.
    pub artifacts: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::all()
    }
}

impl AnalyzerConfig {
    /// Run every analyzer.
    #[must_use]
    pub fn all() -> Self {
        Self {
            edges: true,
            noise: true,
            histogram: true,
            histogram_plots: true,
            metrics: true,
            sharpness: true,
            artifacts: true,
        }
    }

    /// Skips histogram plot rendering, which dominates the cost on small
    /// inputs. The tone scores and the text report are still produced.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            histogram_plots: false,
            ..Self::all()
        }
    }

    /// Whether any enabled analyzer requires equal-sized operands.
    fn requires_equal_sizes(&self) -> bool {
        self.edges || self.noise || self.histogram
    }
}

/// Everything produced by one "run analysis" invocation.
///
/// Held by the caller for display or export; the engine retains no state
/// between calls.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Edge analysis, if enabled.
    pub edges: Option<EdgeAnalysis>,
    /// Noise analysis, if enabled.
    pub noise: Option<NoiseAnalysis>,
    /// Histogram analysis, if enabled.
    pub histogram: Option<HistogramAnalysis>,
    /// Fidelity metrics, if enabled.
    pub metrics: Option<QualityMetrics>,
    /// Sharpness comparison, if enabled.
    pub sharpness: Option<SharpnessScores>,
    /// Artifact scores, if enabled.
    pub artifacts: Option<ArtifactScores>,
    /// When the analysis ran.
    pub timestamp: DateTime<Utc>,
}

/// The scalar portion of an [`AnalysisReport`], serializable to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisScores {
    /// Edge scores, if the analyzer ran.
    pub edges: Option<EdgeScores>,
    /// Noise scores, if the analyzer ran.
    pub noise: Option<NoiseScores>,
    /// Tone scores, if the analyzer ran.
    pub tone: Option<ToneScores>,
    /// Fidelity metrics, if the analyzer ran.
    pub metrics: Option<QualityMetrics>,
    /// Sharpness scores, if the analyzer ran.
    pub sharpness: Option<SharpnessScores>,
    /// Artifact scores, if the analyzer ran.
    pub artifacts: Option<ArtifactScores>,
    /// When the analysis ran.
    #[serde(with = "chrono_serde")]
    pub timestamp: DateTime<Utc>,
}

impl AnalysisReport {
    /// Extract the scalar scores for serialization.
    #[must_use]
    pub fn scores(&self) -> AnalysisScores {
        AnalysisScores {
            edges: self.edges.as_ref().map(|e| e.scores.clone()),
            noise: self.noise.as_ref().map(|n| n.scores.clone()),
            tone: self.histogram.as_ref().map(|h| h.scores.clone()),
            metrics: self.metrics.clone(),
            sharpness: self.sharpness.clone(),
            artifacts: self.artifacts.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Synthesize the plain-text report.
    ///
    /// Returns `None` unless the edge, noise, histogram, and sharpness
    /// analyzers all ran; the metrics and artifacts sections are optional.
    #[must_use]
    pub fn summary_text(&self) -> Option<String> {
        let edges = &self.edges.as_ref()?.scores;
        let noise = &self.noise.as_ref()?.scores;
        let tone = &self.histogram.as_ref()?.scores;
        let sharpness = self.sharpness.as_ref()?;
        Some(report::generate_summary_text(&ReportInput {
            edges,
            noise,
            tone,
            sharpness,
            metrics: self.metrics.as_ref(),
            artifacts: self.artifacts.as_ref(),
        }))
    }
}

impl AnalysisScores {
    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] on serialization failure.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run the enabled analyzers against an original/edited pair.
///
/// Analyzers execute concurrently; they are independent pure functions over
/// the same two immutable snapshots. The artifact detectors run on the
/// edited image only.
///
/// # Errors
///
/// Returns [`crate::Error::DimensionMismatch`] when an enabled analyzer
/// requires equal-sized operands and the pair differs (the caller resamples
/// before invocation; only the metrics analyzer resizes internally), or
/// [`crate::Error::ChartRender`] if histogram plot rasterization fails.
pub fn run_analysis(
    original: &Raster,
    edited: &Raster,
    config: &AnalyzerConfig,
) -> Result<AnalysisReport> {
    if config.requires_equal_sizes() {
        ensure_same_size(original, edited)?;
    }

    let (edge_result, (noise_result, (histogram_result, (metric_result, (sharp, artifact))))) =
        rayon::join(
            || config.edges.then(|| edges::analyze_edges(original, edited)),
            || {
                rayon::join(
                    || config.noise.then(|| noise::analyze_noise(original, edited)),
                    || {
                        rayon::join(
                            || {
                                config.histogram.then(|| {
                                    histogram::analyze_histogram(
                                        original,
                                        edited,
                                        config.histogram_plots,
                                    )
                                })
                            },
                            || {
                                rayon::join(
                                    || {
                                        config
                                            .metrics
                                            .then(|| metrics::analyze_metrics(original, edited))
                                    },
                                    || {
                                        rayon::join(
                                            || {
                                                config.sharpness.then(|| {
                                                    sharpness::analyze_sharpness(original, edited)
                                                })
                                            },
                                            || {
                                                config
                                                    .artifacts
                                                    .then(|| artifacts::analyze_artifacts(edited))
                                            },
                                        )
                                    },
                                )
                            },
                        )
                    },
                )
            },
        );

    Ok(AnalysisReport {
        edges: edge_result.transpose()?,
        noise: noise_result.transpose()?,
        histogram: histogram_result.transpose()?,
        metrics: metric_result,
        sharpness: sharp,
        artifacts: artifact,
        timestamp: Utc::now(),
    })
}

// RFC3339 timestamp serialization, so exported score bundles are readable
// by external tooling.
mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rgb::RGB8;

    fn gradient_raster(w: usize, h: usize) -> Raster {
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[
                    (x * 255 / w.max(1)) as u8,
                    (y * 255 / h.max(1)) as u8,
                    128,
                ]);
            }
        }
        Raster::from_rgb8(&data, w, h).unwrap()
    }

    #[test]
    fn test_full_run_populates_everything() {
        let original = gradient_raster(32, 32);
        let edited = gradient_raster(32, 32);
        let report = run_analysis(&original, &edited, &AnalyzerConfig::all()).unwrap();
        assert!(report.edges.is_some());
        assert!(report.noise.is_some());
        assert!(report.histogram.is_some());
        assert!(report.metrics.is_some());
        assert!(report.sharpness.is_some());
        assert!(report.artifacts.is_some());
        assert!(report.summary_text().is_some());
    }

    #[test]
    fn test_self_comparison_identities() {
        let raster = gradient_raster(32, 32);
        let report = run_analysis(&raster, &raster, &AnalyzerConfig::all()).unwrap();
        let metrics = report.metrics.as_ref().unwrap();
        assert_eq!(metrics.mse, 0.0);
        assert!(metrics.psnr.is_infinite());
        assert!((metrics.ssim - 1.0).abs() < 1e-9);
        assert!((report.edges.as_ref().unwrap().scores.preservation_score - 1.0).abs() < 1e-9);
        assert_eq!(report.noise.as_ref().unwrap().scores.noise_delta, 0.0);
        assert_eq!(
            report.histogram.as_ref().unwrap().scores.histogram_delta_score,
            0.0
        );
    }

    #[test]
    fn test_fast_config_skips_plots_but_keeps_tone_scores() {
        let raster = gradient_raster(16, 16);
        let report = run_analysis(&raster, &raster, &AnalyzerConfig::fast()).unwrap();
        let histogram = report.histogram.as_ref().unwrap();
        assert!(histogram.plots.is_none());
        assert_eq!(histogram.scores.histogram_delta_score, 0.0);
        assert!(report.metrics.is_some());
        // The report only needs the scalar scores, not the plots.
        assert!(report.summary_text().is_some());
    }

    #[test]
    fn test_histogram_disabled_entirely() {
        let raster = gradient_raster(16, 16);
        let config = AnalyzerConfig {
            histogram: false,
            ..AnalyzerConfig::all()
        };
        let report = run_analysis(&raster, &raster, &config).unwrap();
        assert!(report.histogram.is_none());
        // Summary needs the histogram scores.
        assert!(report.summary_text().is_none());
    }

    #[test]
    fn test_mismatched_sizes_rejected_for_equal_size_analyzers() {
        let a = gradient_raster(16, 16);
        let b = gradient_raster(20, 16);
        let result = run_analysis(&a, &b, &AnalyzerConfig::all());
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_mismatched_sizes_allowed_for_metrics_only() {
        let a = gradient_raster(16, 16);
        let b = gradient_raster(20, 16);
        let config = AnalyzerConfig {
            edges: false,
            noise: false,
            histogram: false,
            ..AnalyzerConfig::all()
        };
        let report = run_analysis(&a, &b, &config).unwrap();
        assert!(report.metrics.is_some());
    }

    #[test]
    fn test_scores_json_roundtrip() {
        let raster = gradient_raster(16, 16);
        let report = run_analysis(&raster, &raster, &AnalyzerConfig::fast()).unwrap();
        let json = report.scores().to_json().unwrap();
        let parsed: AnalysisScores = serde_json::from_str(&json).unwrap();
        assert!(parsed.metrics.is_some());
        assert!(parsed.tone.is_some());
        assert_eq!(parsed.timestamp, report.timestamp);
    }

    #[test]
    fn test_solid_raster_degenerate_sentinels() {
        let solid = Raster::solid(100, 100, RGB8::new(255, 0, 0));
        let report = run_analysis(&solid, &solid, &AnalyzerConfig::all()).unwrap();
        let metrics = report.metrics.as_ref().unwrap();
        assert_eq!(metrics.mse, 0.0);
        assert!(metrics.psnr.is_infinite());
        assert!((metrics.ssim - 1.0).abs() < 1e-6);
        assert!(metrics.snr_original.is_infinite());
        assert_eq!(metrics.entropy_original, 0.0);
        // Textureless pair: preservation falls back to the 0.0 sentinel.
        assert_eq!(report.edges.as_ref().unwrap().scores.preservation_score, 0.0);
    }
}
