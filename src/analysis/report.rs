//! Plain-text report synthesis.
//!
//! Pure formatting over already-computed analyzer scores; no numeric work
//! happens here.

use std::fmt::Write as _;

use crate::analysis::artifacts::ArtifactScores;
use crate::analysis::edges::EdgeScores;
use crate::analysis::histogram::ToneScores;
use crate::analysis::metrics::QualityMetrics;
use crate::analysis::noise::NoiseScores;
use crate::analysis::sharpness::SharpnessScores;

/// Analyzer scores feeding the report. Metrics and artifacts are optional;
/// their sections are omitted when absent.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    /// Edge analysis scores.
    pub edges: &'a EdgeScores,
    /// Noise analysis scores.
    pub noise: &'a NoiseScores,
    /// Histogram tone scores.
    pub tone: &'a ToneScores,
    /// Sharpness comparison scores.
    pub sharpness: &'a SharpnessScores,
    /// Fidelity metrics (optional section).
    pub metrics: Option<&'a QualityMetrics>,
    /// Artifact scores (optional section).
    pub artifacts: Option<&'a ArtifactScores>,
}

/// One-line verdict for the executive summary.
///
/// Later checks override earlier ones: a noise increase downgrades the
/// verdict, and a sharpness decrease overrides that again.
fn verdict(noise: &NoiseScores, sharpness: &SharpnessScores) -> &'static str {
    let mut verdict = "improved";
    if noise.noise_delta > 0.0 {
        verdict = "degraded (more noise)";
    }
    if sharpness.sharpness_delta < 0.0 {
        verdict = "softer/blurred";
    }
    verdict
}

/// Generate the multi-section analysis report.
#[must_use]
pub fn generate_summary_text(input: &ReportInput<'_>) -> String {
    let mut out = String::with_capacity(1024);
    let rule = "-".repeat(20);

    out.push_str("=== Image Edit Analysis Report ===\n");
    out.push_str("==================================\n\n");

    out.push_str("1. EXECUTIVE SUMMARY\n");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "The edited image appears to be {} compared to the original.",
        verdict(input.noise, input.sharpness)
    );
    let _ = writeln!(
        out,
        "\u{2022} Sharpness: {}",
        if input.sharpness.sharpness_delta > 0.0 { "Increased" } else { "Decreased" }
    );
    let _ = writeln!(
        out,
        "\u{2022} Noise:     {}",
        if input.noise.noise_delta > 0.0 { "Increased" } else { "Decreased" }
    );
    let _ = writeln!(
        out,
        "\u{2022} Edges:     {}",
        if input.edges.density_delta > 0.0 { "More Details" } else { "Smoother" }
    );
    out.push('\n');

    if let Some(metrics) = input.metrics {
        out.push_str("2. QUALITY METRICS\n");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "\u{2022} PSNR: {:.2} dB (Signal-to-Noise Ratio)", metrics.psnr);
        let _ = writeln!(out, "\u{2022} SSIM: {:.4} (Structural Similarity)", metrics.ssim);
        let _ = writeln!(out, "\u{2022} MSE:  {:.2} (Error Magnitude)", metrics.mse);
        out.push('\n');
    }

    if let Some(artifacts) = input.artifacts {
        out.push_str("3. SIGNAL ANALYSIS\n");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "\u{2022} Compression Artifacts: {:.2} (Lower is better)",
            artifacts.compression
        );
        let _ = writeln!(out, "\u{2022} Oversmoothing Risk:    {:.2}", artifacts.oversmoothing);
        out.push('\n');
    }

    out.push_str("4. COLOR & TONE\n");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "\u{2022} Brightness Delta: {:.2}", input.tone.brightness_delta);
    let _ = writeln!(out, "\u{2022} Contrast Delta:   {:.2}", input.tone.contrast_delta);
    let _ = writeln!(
        out,
        "\u{2022} Histogram Shift:  {:.2}%",
        input.tone.histogram_delta_score
    );
    out.push('\n');

    out.push_str("End of Report\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_scores() -> EdgeScores {
        EdgeScores {
            density_original: 0.1,
            density_edited: 0.2,
            density_delta: 0.1,
            preservation_score: 0.95,
        }
    }

    fn noise_scores(delta: f64) -> NoiseScores {
        NoiseScores {
            noise_original: 10.0,
            noise_edited: 10.0 + delta,
            noise_delta: delta,
            gaussian_sigma_original: 1.0,
            gaussian_sigma_edited: 1.2,
        }
    }

    fn tone_scores() -> ToneScores {
        ToneScores {
            brightness_delta: 5.5,
            contrast_delta: -2.25,
            histogram_delta_score: 12.5,
        }
    }

    fn sharpness_scores(delta: f64) -> SharpnessScores {
        SharpnessScores {
            sharpness_original: 100.0,
            sharpness_edited: 100.0 + delta,
            sharpness_delta: delta,
        }
    }

    #[test]
    fn test_all_sections_present() {
        let metrics = QualityMetrics {
            mse: 12.345,
            psnr: 37.21,
            ssim: 0.98765,
            snr_original: 20.0,
            snr_edited: 19.5,
            entropy_original: 7.2,
            entropy_edited: 7.1,
        };
        let artifacts = ArtifactScores {
            compression: 1.5,
            oversmoothing: 321.0,
        };
        let edges = edge_scores();
        let noise = noise_scores(-1.0);
        let tone = tone_scores();
        let sharpness = sharpness_scores(3.0);
        let text = generate_summary_text(&ReportInput {
            edges: &edges,
            noise: &noise,
            tone: &tone,
            sharpness: &sharpness,
            metrics: Some(&metrics),
            artifacts: Some(&artifacts),
        });

        assert!(text.contains("1. EXECUTIVE SUMMARY"));
        assert!(text.contains("2. QUALITY METRICS"));
        assert!(text.contains("3. SIGNAL ANALYSIS"));
        assert!(text.contains("4. COLOR & TONE"));
        assert!(text.contains("improved"));
        assert!(text.contains("PSNR: 37.21 dB"));
        assert!(text.contains("SSIM: 0.9877"));
        assert!(text.contains("Histogram Shift:  12.50%"));
        assert!(text.ends_with("End of Report\n"));
    }

    #[test]
    fn test_optional_sections_omitted() {
        let edges = edge_scores();
        let noise = noise_scores(-1.0);
        let tone = tone_scores();
        let sharpness = sharpness_scores(1.0);
        let text = generate_summary_text(&ReportInput {
            edges: &edges,
            noise: &noise,
            tone: &tone,
            sharpness: &sharpness,
            metrics: None,
            artifacts: None,
        });
        assert!(!text.contains("2. QUALITY METRICS"));
        assert!(!text.contains("3. SIGNAL ANALYSIS"));
        assert!(text.contains("4. COLOR & TONE"));
    }

    #[test]
    fn test_verdict_precedence() {
        // Noise increase downgrades the verdict.
        assert_eq!(
            verdict(&noise_scores(5.0), &sharpness_scores(1.0)),
            "degraded (more noise)"
        );
        // Sharpness decrease overrides the noise verdict.
        assert_eq!(
            verdict(&noise_scores(5.0), &sharpness_scores(-1.0)),
            "softer/blurred"
        );
        // Neither fires: improved.
        assert_eq!(verdict(&noise_scores(-1.0), &sharpness_scores(1.0)), "improved");
    }

    #[test]
    fn test_infinite_psnr_formats() {
        let metrics = QualityMetrics {
            mse: 0.0,
            psnr: f64::INFINITY,
            ssim: 1.0,
            snr_original: f64::INFINITY,
            snr_edited: f64::INFINITY,
            entropy_original: 0.0,
            entropy_edited: 0.0,
        };
        let edges = edge_scores();
        let noise = noise_scores(0.0);
        let tone = tone_scores();
        let sharpness = sharpness_scores(0.0);
        let text = generate_summary_text(&ReportInput {
            edges: &edges,
            noise: &noise,
            tone: &tone,
            sharpness: &sharpness,
            metrics: Some(&metrics),
            artifacts: None,
        });
        assert!(text.contains("PSNR: inf dB"));
    }
}
