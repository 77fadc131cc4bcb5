// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tonal normalizer — grayscale conversion, smoothing, adaptive and global
// binarization, histogram equalization and edge maps.
//
// Binary rasters produced here use black (0) for ink and white (255) for
// background.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast;
use imageproc::edges::canny;
use imageproc::filter::{box_filter, separable_filter_equal};
use imageproc::gradients::horizontal_sobel;
use imageproc::map::map_colors;
use tracing::{debug, instrument};

pub const INK: u8 = 0;
pub const PAPER: u8 = 255;

/// Reduce a raster to a single luma channel.
pub fn grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    }
}

/// Gaussian sigma for a square kernel of side `kernel`, matching the usual
/// `0.3 * ((k - 1) / 2 - 1) + 0.8` rule (0.8 for a 3x3 kernel).
fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian taps for an odd `kernel` width.
///
/// Widths up to 7 use the fixed binomial tables; wider kernels sample a
/// Gaussian with [`sigma_for_kernel`].
fn gaussian_taps(kernel: u32) -> Vec<f32> {
    match kernel {
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
        _ => {
            let sigma = sigma_for_kernel(kernel);
            let center = (kernel as f32 - 1.0) * 0.5;
            let raw: Vec<f32> = (0..kernel)
                .map(|i| {
                    let d = i as f32 - center;
                    (-(d * d) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let sum: f32 = raw.iter().sum();
            raw.into_iter().map(|w| w / sum).collect()
        }
    }
}

/// Smooth with a separable Gaussian of exactly `kernel` taps per axis.
///
/// A kernel of 1 is the identity. Edges replicate the border pixel.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn gaussian_blur(image: &GrayImage, kernel: u32) -> GrayImage {
    if kernel <= 1 {
        return image.clone();
    }
    let taps = gaussian_taps(kernel);
    debug!(taps = taps.len(), "Applying Gaussian blur");
    separable_filter_equal(image, &taps)
}

/// 5x5 (or `kernel` x `kernel`) mean blur.
pub fn box_blur(image: &GrayImage, kernel: u32) -> GrayImage {
    let radius = kernel / 2;
    if radius == 0 {
        return image.clone();
    }
    box_filter(image, radius, radius)
}

/// Local-mean adaptive thresholding.
///
/// For each pixel the threshold is the mean intensity of the `block` x `block`
/// window centred on it (clipped at the raster edge) minus `bias`. Pixels at
/// or below the threshold become ink, everything else paper, so uneven
/// illumination only shifts the local threshold.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn adaptive_binarize(image: &GrayImage, block: u32, bias: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = block / 2;
    let integral = IntegralImage::new(image);
    let bias = bias as f64;

    let output = GrayImage::from_fn(width, height, |x, y| {
        let threshold = integral.window_mean(x, y, radius) - bias;
        let value = image.get_pixel(x, y).0[0] as f64;
        Luma([if value <= threshold { INK } else { PAPER }])
    });

    debug!(block, bias, "Adaptive binarization complete");
    output
}

/// Global binarization at the Otsu level of the histogram.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn otsu_binarize(image: &GrayImage) -> GrayImage {
    let level = contrast::otsu_level(image);
    debug!(level, "Otsu level computed");
    map_colors(image, |p| Luma([if p.0[0] <= level { INK } else { PAPER }]))
}

/// Spread intensities across the full range.
pub fn equalize_histogram(image: &GrayImage) -> GrayImage {
    contrast::equalize_histogram(image)
}

/// Horizontal first derivative, saturated to `0..=255`.
pub fn sobel_x(image: &GrayImage) -> GrayImage {
    let gradient = horizontal_sobel(image);
    map_colors(&gradient, |p| Luma([p.0[0].clamp(0, 255) as u8]))
}

/// Canny edge map (edges 255 on 0) after a Gaussian pre-blur of `blur_kernel`.
///
/// `canny` smooths with its own sigma 1.4 Gaussian as well. The pre-blur is
/// the fixed-size smoothing step of the skew pipeline and stays in front of
/// it, so the edges come from the doubly smoothed raster.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn edge_map(image: &GrayImage, blur_kernel: u32, low: f32, high: f32) -> GrayImage {
    let smoothed = gaussian_blur(image, blur_kernel);
    canny(&smoothed, low, high)
}

// -- Integral image -----------------------------------------------------------

/// Summed-area table with a zero-padded first row and column.
///
/// `table[y * (width + 1) + x]` holds the sum of all pixels in `[0, x) x [0, y)`.
struct IntegralImage {
    table: Vec<u64>,
    width: u32,
    height: u32,
}

impl IntegralImage {
    fn new(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let stride = (width + 1) as usize;
        let mut table = vec![0u64; stride * (height + 1) as usize];

        for y in 0..height as usize {
            let mut row_sum = 0u64;
            for x in 0..width as usize {
                row_sum += gray.get_pixel(x as u32, y as u32).0[0] as u64;
                table[(y + 1) * stride + x + 1] = row_sum + table[y * stride + x + 1];
            }
        }

        Self {
            table,
            width,
            height,
        }
    }

    /// Mean of the square window of `radius` around (cx, cy), clipped to the
    /// raster.
    fn window_mean(&self, cx: u32, cy: u32, radius: u32) -> f64 {
        let stride = (self.width + 1) as usize;
        let x1 = cx.saturating_sub(radius) as usize;
        let y1 = cy.saturating_sub(radius) as usize;
        let x2 = (cx as usize + radius as usize + 1).min(self.width as usize);
        let y2 = (cy as usize + radius as usize + 1).min(self.height as usize);

        let area = ((x2 - x1) * (y2 - y1)) as f64;
        if area == 0.0 {
            return 0.0;
        }

        let sum = self.table[y2 * stride + x2] + self.table[y1 * stride + x1]
            - self.table[y1 * stride + x2]
            - self.table[y2 * stride + x1];
        sum as f64 / area
    }
}
