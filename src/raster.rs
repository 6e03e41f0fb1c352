//! Raster value types and low-level pixel utilities.
//!
//! All analyzers operate on [`Raster`] (8-bit RGB) inputs and exchange
//! intermediate data as [`ScalarField`]s (per-pixel f32 values such as
//! gradient magnitude or local variance). Display outputs are either
//! [`GrayImage`] or [`RgbImage`].

use imgref::ImgVec;
use rgb::RGB8;

use crate::error::{Error, Result};

/// Per-pixel scalar field (gradient magnitude, local variance, filter
/// response). Stride always equals width.
pub type ScalarField = ImgVec<f32>;

/// 8-bit grayscale display image.
pub type GrayImage = ImgVec<u8>;

/// 8-bit RGB display image.
pub type RgbImage = ImgVec<RGB8>;

/// An immutable 8-bit RGB raster.
///
/// Rasters are value types: analyzers never mutate their inputs, so a pair
/// of rasters can be shared freely across concurrently running analyzers.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: RgbImage,
}

impl Raster {
    /// Wrap an existing RGB pixel grid.
    #[must_use]
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Build a raster from interleaved RGB8 bytes in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBuffer`] if `data.len() != width * height * 3`.
    pub fn from_rgb8(data: &[u8], width: usize, height: usize) -> Result<Self> {
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(Error::InvalidBuffer {
                expected,
                actual: data.len(),
            });
        }
        let pixels: Vec<RGB8> = data
            .chunks_exact(3)
            .map(|c| RGB8::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self {
            pixels: ImgVec::new(pixels, width, height),
        })
    }

    /// Build a solid-color raster.
    #[must_use]
    pub fn solid(width: usize, height: usize, color: RGB8) -> Self {
        Self {
            pixels: ImgVec::new(vec![color; width * height], width, height),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// Dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Borrow the underlying pixel grid.
    #[must_use]
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Iterate over every channel value (R, G, B interleaved) as f32.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.pixels
            .pixels()
            .flat_map(|p| [f32::from(p.r), f32::from(p.g), f32::from(p.b)])
    }

    /// Interleaved RGB8 bytes in row-major order.
    #[must_use]
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .pixels()
            .flat_map(|p| [p.r, p.g, p.b])
            .collect()
    }

    /// Convert to a grayscale field using integer Rec.601 luma,
    /// `(299 R + 587 G + 114 B) / 1000`, truncated to u8 before the float
    /// conversion so grayscale-derived metrics bin exactly on 0-255.
    #[must_use]
    pub fn luma(&self) -> ScalarField {
        let gray: Vec<f32> = self
            .pixels
            .pixels()
            .map(|p| {
                let l = (299 * u32::from(p.r) + 587 * u32::from(p.g) + 114 * u32::from(p.b)) / 1000;
                l as f32
            })
            .collect();
        ImgVec::new(gray, self.width(), self.height())
    }

    /// Bilinear resize to exactly `width` x `height`.
    #[must_use]
    pub fn resize(&self, width: usize, height: usize) -> Self {
        if (width, height) == self.dimensions() {
            return self.clone();
        }
        let (sw, sh) = self.dimensions();
        let src = self.pixels.buf();
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            // Pixel-center mapping, clamped at the borders.
            let fy = ((y as f32 + 0.5) * sh as f32 / height as f32 - 0.5).clamp(0.0, sh as f32 - 1.0);
            let y0 = fy.floor() as usize;
            let y1 = (y0 + 1).min(sh - 1);
            let ty = fy - y0 as f32;
            for x in 0..width {
                let fx =
                    ((x as f32 + 0.5) * sw as f32 / width as f32 - 0.5).clamp(0.0, sw as f32 - 1.0);
                let x0 = fx.floor() as usize;
                let x1 = (x0 + 1).min(sw - 1);
                let tx = fx - x0 as f32;

                let lerp = |c: fn(&RGB8) -> u8| -> u8 {
                    let p00 = f32::from(c(&src[y0 * sw + x0]));
                    let p01 = f32::from(c(&src[y0 * sw + x1]));
                    let p10 = f32::from(c(&src[y1 * sw + x0]));
                    let p11 = f32::from(c(&src[y1 * sw + x1]));
                    let top = p00 + (p01 - p00) * tx;
                    let bottom = p10 + (p11 - p10) * tx;
                    (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8
                };
                out.push(RGB8::new(lerp(|p| p.r), lerp(|p| p.g), lerp(|p| p.b)));
            }
        }
        Self {
            pixels: ImgVec::new(out, width, height),
        }
    }

    /// Downsample so both dimensions fit within `max_width` x `max_height`,
    /// preserving aspect ratio. Never upscales.
    ///
    /// The analysis engine itself does not resample; this is a convenience
    /// for collaborators that bound the analysis resolution before invoking
    /// the analyzers.
    #[must_use]
    pub fn fit_within(&self, max_width: usize, max_height: usize) -> Self {
        let (w, h) = self.dimensions();
        let scale = (max_width as f64 / w as f64)
            .min(max_height as f64 / h as f64)
            .min(1.0);
        if scale >= 1.0 {
            return self.clone();
        }
        let nw = ((w as f64 * scale).round() as usize).max(1);
        let nh = ((h as f64 * scale).round() as usize).max(1);
        self.resize(nw, nh)
    }
}

/// Verify that two rasters share identical pixel dimensions.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] when the dimensions differ.
pub fn ensure_same_size(original: &Raster, edited: &Raster) -> Result<()> {
    if original.dimensions() != edited.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: original.dimensions(),
            actual: edited.dimensions(),
        });
    }
    Ok(())
}

/// Linearly rescale a scalar field to the 0-255 display range.
///
/// `(v - min) / (max - min) * 255`, truncated. A constant-valued field maps
/// to all zeros rather than dividing by zero.
#[must_use]
pub fn normalize_to_u8(field: &ScalarField) -> GrayImage {
    let buf = field.buf();
    let min = buf.iter().copied().fold(f32::INFINITY, f32::min);
    let max = buf.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let out: Vec<u8> = if max - min == 0.0 {
        vec![0; buf.len()]
    } else {
        let range = max - min;
        buf.iter().map(|&v| ((v - min) / range * 255.0) as u8).collect()
    };
    ImgVec::new(out, field.width(), field.height())
}

/// Border handling for 1-pixel padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Replicate the border sample.
    Edge,
    /// Mirror about the border sample (the border itself is not repeated).
    Reflect,
}

/// Pad a scalar field by one pixel on every side.
#[must_use]
pub fn pad1(field: &ScalarField, mode: PadMode) -> ScalarField {
    let (w, h) = (field.width(), field.height());
    let buf = field.buf();
    let index = |i: isize, n: usize| -> usize {
        match mode {
            PadMode::Edge => i.clamp(0, n as isize - 1) as usize,
            PadMode::Reflect => {
                if n == 1 {
                    0
                } else if i < 0 {
                    (-i) as usize
                } else if i as usize >= n {
                    2 * n - 2 - i as usize
                } else {
                    i as usize
                }
            }
        }
    };
    let mut out = Vec::with_capacity((w + 2) * (h + 2));
    for y in -1..=h as isize {
        let sy = index(y, h);
        for x in -1..=w as isize {
            out.push(buf[sy * w + index(x, w)]);
        }
    }
    ImgVec::new(out, w + 2, h + 2)
}

/// Correlate a scalar field with a 3x3 kernel (no kernel flip), padding the
/// border with `mode`. The output has the same dimensions as the input.
#[must_use]
pub fn correlate3(field: &ScalarField, kernel: &[[f32; 3]; 3], mode: PadMode) -> ScalarField {
    let (w, h) = (field.width(), field.height());
    let padded = pad1(field, mode);
    let pbuf = padded.buf();
    let pw = w + 2;
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (ky, row) in kernel.iter().enumerate() {
                for (kx, &k) in row.iter().enumerate() {
                    acc += k * pbuf[(y + ky) * pw + (x + kx)];
                }
            }
            out.push(acc);
        }
    }
    ImgVec::new(out, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(data: Vec<f32>, w: usize, h: usize) -> ScalarField {
        ImgVec::new(data, w, h)
    }

    #[test]
    fn test_from_rgb8_roundtrip() {
        let data = vec![255u8, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30];
        let raster = Raster::from_rgb8(&data, 2, 2).unwrap();
        assert_eq!(raster.dimensions(), (2, 2));
        assert_eq!(raster.to_rgb8(), data);
    }

    #[test]
    fn test_from_rgb8_bad_length() {
        let result = Raster::from_rgb8(&[0u8; 10], 2, 2);
        assert!(matches!(result, Err(Error::InvalidBuffer { expected: 12, actual: 10 })));
    }

    #[test]
    fn test_luma_of_primaries() {
        // Integer Rec.601: truncated, matching 8-bit grayscale conversion.
        let raster = Raster::from_rgb8(&[255, 0, 0, 0, 255, 0, 0, 0, 255], 3, 1).unwrap();
        let luma = raster.luma();
        assert_eq!(luma.buf(), &[76.0, 149.0, 29.0]);
    }

    #[test]
    fn test_normalize_range() {
        let f = field(vec![-3.0, 0.0, 5.0, 7.0], 2, 2);
        let norm = normalize_to_u8(&f);
        assert_eq!(norm.buf()[0], 0);
        assert_eq!(norm.buf()[3], 255);
        assert!(norm.buf().iter().all(|&v| v <= 255));
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let f = field(vec![42.0; 9], 3, 3);
        let norm = normalize_to_u8(&f);
        assert!(norm.buf().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_pad1_edge() {
        let f = field(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let p = pad1(&f, PadMode::Edge);
        assert_eq!(p.width(), 4);
        assert_eq!(p.height(), 4);
        // Corner replicates the nearest sample.
        assert_eq!(p.buf()[0], 1.0);
        assert_eq!(p.buf()[15], 4.0);
    }

    #[test]
    fn test_pad1_reflect() {
        let f = field(vec![1.0, 2.0, 3.0], 3, 1);
        let p = pad1(&f, PadMode::Reflect);
        // Row: reflect of [1 2 3] -> [2 1 2 3 2]
        assert_eq!(&p.buf()[0..5], &[2.0, 1.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_correlate3_identity_kernel() {
        let f = field((1..=9).map(|v| v as f32).collect(), 3, 3);
        let kernel = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let out = correlate3(&f, &kernel, PadMode::Edge);
        assert_eq!(out.buf(), f.buf());
    }

    #[test]
    fn test_resize_solid_stays_solid() {
        let raster = Raster::solid(10, 10, RGB8::new(120, 30, 200));
        let resized = raster.resize(4, 7);
        assert_eq!(resized.dimensions(), (4, 7));
        assert!(resized.pixels().pixels().all(|p| p == RGB8::new(120, 30, 200)));
    }

    #[test]
    fn test_fit_within_preserves_aspect() {
        let raster = Raster::solid(400, 200, RGB8::new(0, 0, 0));
        let small = raster.fit_within(100, 100);
        assert_eq!(small.dimensions(), (100, 50));
        // Never upscales.
        let same = raster.fit_within(800, 800);
        assert_eq!(same.dimensions(), (400, 200));
    }

    #[test]
    fn test_ensure_same_size() {
        let a = Raster::solid(4, 4, RGB8::new(0, 0, 0));
        let b = Raster::solid(4, 5, RGB8::new(0, 0, 0));
        assert!(ensure_same_size(&a, &a).is_ok());
        assert!(matches!(
            ensure_same_size(&a, &b),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
