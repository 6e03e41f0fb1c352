//! Image decode/encode for the CLI: PNG and JPEG in, lossless PNG out.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, bail};
use edit_eval::Raster;
use edit_eval::raster::{GrayImage, RgbImage};

/// Load a PNG or JPEG file into an RGB raster, chosen by file extension.
pub fn load_image(path: &Path) -> anyhow::Result<Raster> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => load_png(path),
        "jpg" | "jpeg" => load_jpeg(path),
        other => bail!("unsupported image format: .{other} (expected png, jpg, or jpeg)"),
    }
    .with_context(|| format!("failed to load {}", path.display()))
}

fn load_png(path: &Path) -> anyhow::Result<Raster> {
    let mut decoder = png::Decoder::new(BufReader::new(File::open(path)?));
    // Expand palette/low-bit-depth images and strip 16-bit samples so every
    // input lands on one of four 8-bit color types.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];
    let (width, height) = (info.width as usize, info.height as usize);

    let rgb: Vec<u8> = match info.color_type {
        png::ColorType::Rgb => bytes.to_vec(),
        png::ColorType::Rgba => bytes
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect(),
        png::ColorType::Grayscale => bytes.iter().flat_map(|&g| [g, g, g]).collect(),
        png::ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0]])
            .collect(),
        png::ColorType::Indexed => bail!("indexed PNG not expanded by decoder"),
    };
    Ok(Raster::from_rgb8(&rgb, width, height)?)
}

fn load_jpeg(path: &Path) -> anyhow::Result<Raster> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(File::open(path)?));
    let pixels = decoder.decode()?;
    let info = decoder
        .info()
        .context("missing JPEG info after decode")?;
    let (width, height) = (info.width as usize, info.height as usize);

    let rgb: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => {
            // Take the high byte of each 16-bit grayscale sample.
            pixels
                .chunks_exact(2)
                .flat_map(|c| {
                    let g = c[0];
                    [g, g, g]
                })
                .collect()
        }
        jpeg_decoder::PixelFormat::CMYK32 => bail!("CMYK JPEGs are not supported"),
    };
    Ok(Raster::from_rgb8(&rgb, width, height)?)
}

/// Write an RGB image as an 8-bit PNG.
pub fn save_rgb_png(path: &Path, image: &RgbImage) -> anyhow::Result<()> {
    let data: Vec<u8> = image.pixels().flat_map(|p| [p.r, p.g, p.b]).collect();
    write_png(path, &data, image.width(), image.height(), png::ColorType::Rgb)
}

/// Write a grayscale image as an 8-bit PNG.
pub fn save_gray_png(path: &Path, image: &GrayImage) -> anyhow::Result<()> {
    write_png(
        path,
        image.buf(),
        image.width(),
        image.height(),
        png::ColorType::Grayscale,
    )
}

fn write_png(
    path: &Path,
    data: &[u8],
    width: usize,
    height: usize,
    color: png::ColorType,
) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width as u32, height as u32);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    Ok(())
}
