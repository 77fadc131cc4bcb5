// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rotator & cropper — angle-compensated rotation onto an enlarged canvas,
// document boundary detection from axis-aligned segments, and bounds-safe
// rectangular cropping.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanprep_core::config::CropConfig;
use scanprep_core::types::{BoundingRect, Extremes, LineSegment};
use tracing::{debug, instrument, warn};

use super::hough::detect_segments;

/// Canvas size that holds a `width` x `height` raster rotated by `degrees`.
///
/// `width' = h|sin| + w|cos|`, `height' = w|sin| + h|cos|`, truncated.
pub fn rotated_canvas(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f64, height as f64);
    let new_width = (h * sin.abs() + w * cos.abs()) as u32;
    let new_height = (w * sin.abs() + h * cos.abs()) as u32;
    (new_width.max(1), new_height.max(1))
}

/// Forward (source to canvas) rotation about the source centre, shifted so the
/// result is centred on the enlarged canvas. Positive angles turn the page
/// counter-clockwise as displayed.
fn rotation_projection(
    width: u32,
    height: u32,
    degrees: f64,
) -> Option<(Projection, u32, u32)> {
    let (canvas_w, canvas_h) = rotated_canvas(width, height, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;

    let shift_x = ((canvas_w as i64 - width as i64) / 2) as f64;
    let shift_y = ((canvas_h as i64 - height as i64) / 2) as f64;
    let tx = (1.0 - cos) * cx - sin * cy + shift_x;
    let ty = sin * cx + (1.0 - cos) * cy + shift_y;

    let matrix = [
        cos as f32, sin as f32, tx as f32,
        -sin as f32, cos as f32, ty as f32,
        0.0, 0.0, 1.0,
    ];
    Projection::from_matrix(matrix).map(|p| (p, canvas_w, canvas_h))
}

/// Rotate a grayscale raster by `degrees` with bicubic resampling. Exposed
/// corners are filled with 0.
///
/// An angle of exactly zero returns an untouched copy.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rotate_gray(image: &GrayImage, degrees: f64) -> GrayImage {
    if degrees == 0.0 {
        return image.clone();
    }
    let Some((projection, canvas_w, canvas_h)) =
        rotation_projection(image.width(), image.height(), degrees)
    else {
        warn!(degrees, "Rotation matrix not invertible; returning unchanged");
        return image.clone();
    };
    let mut out = GrayImage::new(canvas_w, canvas_h);
    warp_into(image, &projection, Interpolation::Bicubic, Luma([0u8]), &mut out);
    debug!(canvas_w, canvas_h, "Grayscale rotation applied");
    out
}

/// Rotate any raster by `degrees`, keeping grayscale and RGB rasters in their
/// own colour type and routing everything else through RGBA.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rotate(image: &DynamicImage, degrees: f64) -> DynamicImage {
    if degrees == 0.0 {
        return image.clone();
    }
    let Some((projection, canvas_w, canvas_h)) =
        rotation_projection(image.width(), image.height(), degrees)
    else {
        warn!(degrees, "Rotation matrix not invertible; returning unchanged");
        return image.clone();
    };

    match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(canvas_w, canvas_h);
            warp_into(gray, &projection, Interpolation::Bicubic, Luma([0u8]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        DynamicImage::ImageRgb8(rgb) => {
            let mut out = RgbImage::new(canvas_w, canvas_h);
            warp_into(rgb, &projection, Interpolation::Bicubic, Rgb([0u8; 3]), &mut out);
            DynamicImage::ImageRgb8(out)
        }
        other => {
            let rgba = other.to_rgba8();
            let mut out = RgbaImage::new(canvas_w, canvas_h);
            warp_into(&rgba, &projection, Interpolation::Bicubic, Rgba([0, 0, 0, 255]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
    }
}

// -- Boundary detection -------------------------------------------------------

/// Keep only segments that run along a raster axis.
///
/// Near-horizontal: endpoint rows differ by less than `axis_tolerance` and the
/// columns span more than `min_span`. Near-vertical likewise with axes swapped.
pub fn axis_aligned_segments(segments: &[LineSegment], config: &CropConfig) -> Vec<LineSegment> {
    segments
        .iter()
        .filter(|s| {
            s.is_near_horizontal(config.axis_tolerance, config.min_span)
                || s.is_near_vertical(config.axis_tolerance, config.min_span)
        })
        .copied()
        .collect()
}

/// Document boundary inside a `cols` x `rows` raster.
///
/// The extremes of all retained segment endpoints must lie strictly inside
/// the raster; otherwise there is no boundary and `None` is returned.
pub fn boundary_from_segments(
    segments: &[LineSegment],
    cols: u32,
    rows: u32,
    margin: f64,
) -> Option<BoundingRect> {
    let extremes = Extremes::of(segments.iter().flat_map(LineSegment::endpoints))?;
    if !extremes.strictly_inside(cols, rows) {
        debug!(?extremes, cols, rows, "Boundary touches the raster edge");
        return None;
    }
    Some(BoundingRect::inset(&extremes, margin))
}

/// Run boundary line detection on a rotated edge map.
#[instrument(skip(edges, config), fields(width = edges.width(), height = edges.height()))]
pub fn detect_boundary(edges: &GrayImage, config: &CropConfig) -> (Option<BoundingRect>, usize) {
    let segments = detect_segments(edges, &config.hough);
    let aligned = axis_aligned_segments(&segments, config);
    debug!(
        detected = segments.len(),
        aligned = aligned.len(),
        "Boundary segments filtered"
    );
    (
        boundary_from_segments(&aligned, edges.width(), edges.height(), config.margin),
        aligned.len(),
    )
}

/// Crop `image` to the window spanned by `rect`, clamped to the raster.
///
/// Returns `None` when the window is empty.
pub fn shear(image: &DynamicImage, rect: &BoundingRect) -> Option<DynamicImage> {
    let window = rect.crop_window(image.width(), image.height())?;
    debug!(?window, "Cropping to boundary");
    Some(image.crop_imm(window.x, window.y, window.width, window.height))
}
