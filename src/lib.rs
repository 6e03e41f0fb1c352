//! # edit-eval
//!
//! Image edit quality analysis engine.
//!
//! Given an "original" image and an "edited" derivative of it, this library
//! produces quantitative and visual diagnostics: edge preservation, noise
//! level, histogram shift, fidelity metrics, and compression artifacts.
//! The engine is a deterministic, stateless batch of transforms over two
//! fixed-size raster buffers; the surrounding application (UI, CLI, batch
//! runner) owns file I/O, resampling policy, and result presentation.
//!
//! ## Quick Start
//!
//! ```rust
//! use edit_eval::{AnalyzerConfig, Raster, run_analysis};
//! use rgb::RGB8;
//!
//! let original = Raster::solid(64, 64, RGB8::new(200, 120, 40));
//! let edited = Raster::solid(64, 64, RGB8::new(190, 120, 40));
//!
//! let report = run_analysis(&original, &edited, &AnalyzerConfig::all())?;
//! println!("{}", report.summary_text().unwrap());
//! # Ok::<(), edit_eval::Error>(())
//! ```
//!
//! ## Contract
//!
//! All pairwise analyzers require operands of identical dimensions; the
//! caller downsamples and aligns the pair before invocation. The single
//! exception is [`analysis::metrics::analyze_metrics`], which bilinearly
//! resizes a mismatched edited operand. Degenerate inputs (solid colors,
//! zero-variance fields) yield documented sentinel values rather than
//! errors.
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`raster`]: Raster value types and pixel utilities
//! - [`stats`]: Scalar statistics shared by the analyzers
//! - [`analysis`]: The analyzers and the aggregate entry point
//! - [`chart`]: Histogram plot rendering

pub mod analysis;
pub mod chart;
pub mod error;
pub mod raster;
pub mod stats;

// Re-export commonly used types
pub use analysis::{
    AnalysisReport, AnalysisScores, AnalyzerConfig, run_analysis,
    artifacts::ArtifactScores,
    edges::{EdgeAnalysis, EdgeScores},
    histogram::{ChannelHistogram, HistogramAnalysis, ToneScores},
    metrics::QualityMetrics,
    noise::{NoiseAnalysis, NoiseScores},
    report::{ReportInput, generate_summary_text},
    sharpness::SharpnessScores,
};
pub use error::{Error, Result};
pub use raster::{GrayImage, Raster, RgbImage, ScalarField};
