// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skew estimator — turns a page into an edge map of its large structures and
// measures the tilt of the longest straight segment found there.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use scanprep_core::config::PipelineConfig;
use scanprep_core::types::{LineSegment, SkewAngle, longest_segment};
use tracing::{debug, info, instrument, warn};

use super::denoise::neighborhood_denoise;
use super::hough::detect_segments;
use super::region::{extract_contours, suppress_small_contours};
use super::tonal::{adaptive_binarize, edge_map};

/// Result of measuring a page's tilt.
#[derive(Debug, Clone, PartialEq)]
pub struct SkewEstimate {
    /// Correction angle in `[0, 90)`.
    pub angle: SkewAngle,
    /// Segment the angle was measured on; the degenerate segment when nothing
    /// was detected.
    pub reference: LineSegment,
    /// Number of segments the detector reported.
    pub lines_detected: usize,
}

/// Stages of the edge-map preparation, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct SkewStages {
    pub binary: GrayImage,
    pub edges: GrayImage,
    /// Final map handed to line detection.
    pub filtered: GrayImage,
}

/// Build the edge map used for skew detection from a grayscale page.
///
/// Binarize, thin the ink with a 5x5 square, take Canny edges, clean them
/// with one neighbourhood pass, thicken with a 3x3 square, then blank every
/// contour whose rotated bounding box covers less than the configured area.
#[instrument(skip(gray, config), fields(width = gray.width(), height = gray.height()))]
pub fn prepare_edge_map(gray: &GrayImage, config: &PipelineConfig) -> SkewStages {
    let tonal = &config.tonal;
    let skew = &config.skew;

    let binary = adaptive_binarize(gray, tonal.binarize_block, tonal.binarize_bias);

    // Ink is 0 here, so eroding the ink is a maximum filter over the page.
    let thinned = if skew.erode_radius > 0 {
        dilate(&binary, Norm::LInf, skew.erode_radius)
    } else {
        binary.clone()
    };

    let edges = edge_map(&thinned, tonal.blur_kernel, tonal.canny_low, tonal.canny_high);
    let cleaned = neighborhood_denoise(
        &edges,
        config.denoise.isolation_threshold,
        config.denoise.fill_threshold,
    );
    let mut filtered = if skew.dilate_radius > 0 {
        dilate(&cleaned, Norm::LInf, skew.dilate_radius)
    } else {
        cleaned
    };

    let contours = extract_contours(&filtered);
    suppress_small_contours(&mut filtered, &contours, skew.min_contour_area);

    SkewStages {
        binary,
        edges,
        filtered,
    }
}

/// Measure the skew of an edge map prepared by [`prepare_edge_map`].
///
/// The longest detected segment (first found on ties) sets the angle. With no
/// segments the angle is zero, which callers treat as "leave as is".
#[instrument(skip(edges, config), fields(width = edges.width(), height = edges.height()))]
pub fn estimate_skew(edges: &GrayImage, config: &PipelineConfig) -> SkewEstimate {
    let segments = detect_segments(edges, &config.skew.hough);
    let reference = longest_segment(&segments);
    let angle = SkewAngle::of_segment(&reference);

    if segments.is_empty() {
        warn!("No line segments detected; skew defaults to 0");
    } else {
        debug!(
            length = reference.length(),
            raw = reference.raw_angle_degrees(),
            "Longest segment selected"
        );
    }
    info!(angle = angle.degrees(), lines = segments.len(), "Skew estimated");

    SkewEstimate {
        angle,
        reference,
        lines_detected: segments.len(),
    }
}
