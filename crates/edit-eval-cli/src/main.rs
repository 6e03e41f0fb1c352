//! edit-eval CLI - image edit quality analysis tool
//!
//! The collaborator role from the engine's point of view: loads two images,
//! bounds the analysis resolution, aligns operand sizes, runs the analyzers,
//! and writes the report plus result images to disk.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use edit_eval::{AnalyzerConfig, Error, run_analysis};

mod decode;

/// Compare an edited image against its original and report quality changes.
#[derive(Parser)]
#[command(name = "edit-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Original image (png, jpg, jpeg)
    original: PathBuf,

    /// Edited image (png, jpg, jpeg)
    edited: PathBuf,

    /// Output directory for report, scores, and result images
    #[arg(short, long, default_value = "./analysis")]
    out_dir: PathBuf,

    /// Maximum analysis resolution; larger inputs are downsampled
    #[arg(long, default_value_t = 512)]
    max_dim: usize,

    /// Skip histogram plot rendering
    #[arg(long)]
    skip_plots: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let original = decode::load_image(&cli.original)?;
    let edited = decode::load_image(&cli.edited)?;
    if cli.verbose {
        eprintln!(
            "loaded original {}x{}, edited {}x{}",
            original.width(),
            original.height(),
            edited.width(),
            edited.height()
        );
    }

    // Bound the analysis resolution, then align the pair: the engine
    // requires equal-sized operands.
    let original = original.fit_within(cli.max_dim, cli.max_dim);
    let mut edited = edited.fit_within(cli.max_dim, cli.max_dim);
    if edited.dimensions() != original.dimensions() {
        edited = edited.resize(original.width(), original.height());
    }

    let config = if cli.skip_plots {
        AnalyzerConfig::fast()
    } else {
        AnalyzerConfig::all()
    };

    // Partial-result tolerance: a plot rendering failure (e.g. no usable
    // fonts on the host) should not cost us the scalar results.
    let report = match run_analysis(&original, &edited, &config) {
        Ok(report) => report,
        Err(Error::ChartRender(reason)) => {
            eprintln!("warning: histogram plots unavailable ({reason}); continuing without them");
            run_analysis(&original, &edited, &AnalyzerConfig::fast())?
        }
        Err(e) => return Err(e.into()),
    };

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let scores_path = cli.out_dir.join("scores.json");
    fs::write(&scores_path, report.scores().to_json()?)?;
    if cli.verbose {
        eprintln!("wrote {}", scores_path.display());
    }

    if let Some(text) = report.summary_text() {
        fs::write(cli.out_dir.join("report.txt"), &text)?;
        println!("{text}");
    } else {
        println!("scalar scores written to {}", scores_path.display());
    }

    if let Some(edges) = &report.edges {
        decode::save_gray_png(&cli.out_dir.join("edges_original.png"), &edges.original_edges)?;
        decode::save_gray_png(&cli.out_dir.join("edges_edited.png"), &edges.edited_edges)?;
        decode::save_rgb_png(&cli.out_dir.join("edges_diff.png"), &edges.difference_map)?;
    }
    if let Some(noise) = &report.noise {
        decode::save_gray_png(&cli.out_dir.join("noise_original.png"), &noise.original_map)?;
        decode::save_gray_png(&cli.out_dir.join("noise_edited.png"), &noise.edited_map)?;
        decode::save_rgb_png(
            &cli.out_dir.join("noise_heatmap_original.png"),
            &noise.original_heatmap,
        )?;
        decode::save_rgb_png(
            &cli.out_dir.join("noise_heatmap_edited.png"),
            &noise.edited_heatmap,
        )?;
        decode::save_rgb_png(&cli.out_dir.join("noise_diff.png"), &noise.difference_map)?;
    }
    if let Some(plots) = report.histogram.as_ref().and_then(|h| h.plots.as_ref()) {
        decode::save_rgb_png(&cli.out_dir.join("histogram.png"), &plots.combined)?;
    }

    if cli.verbose {
        eprintln!("analysis complete: {}", cli.out_dir.display());
    }
    Ok(())
}
