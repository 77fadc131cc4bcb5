// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Noise suppressor — 3x3 neighbourhood majority cleanup and connected-component
// area filtering.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{self, connected_components};
use scanprep_core::config::Connectivity;
use tracing::{debug, instrument};

use super::tonal::{INK, PAPER};

/// Single forward pass of 3x3 neighbourhood cleanup.
///
/// Only pixels equal to 0 count as black. For every interior pixel, the black
/// samples in its 3x3 window (itself included) are counted:
///
/// - a black pixel with at most `isolation_threshold` black samples turns white;
/// - any other pixel with at least `fill_threshold` black samples turns black.
///
/// The scan runs row by row, left to right, and updates the raster in place, so
/// a window may see neighbours already rewritten earlier in the same pass. That
/// ordering is part of the behaviour: a stray chain end removed early can make
/// its successor an end too. The one-pixel border is never touched.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn neighborhood_denoise(
    image: &GrayImage,
    isolation_threshold: u32,
    fill_threshold: u32,
) -> GrayImage {
    let mut out = image.clone();
    let (width, height) = out.dimensions();
    if width < 3 || height < 3 {
        return out;
    }

    let mut flipped = 0usize;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let black = black_in_window(&out, x, y);
            let value = out.get_pixel(x, y).0[0];
            if value == INK {
                if black <= isolation_threshold {
                    out.put_pixel(x, y, Luma([PAPER]));
                    flipped += 1;
                }
            } else if black >= fill_threshold {
                out.put_pixel(x, y, Luma([INK]));
                flipped += 1;
            }
        }
    }

    debug!(flipped, "Neighbourhood denoise pass complete");
    out
}

fn black_in_window(image: &GrayImage, x: u32, y: u32) -> u32 {
    let mut count = 0;
    for wy in y - 1..=y + 1 {
        for wx in x - 1..=x + 1 {
            if image.get_pixel(wx, wy).0[0] == INK {
                count += 1;
            }
        }
    }
    count
}

/// Erase connected black regions of at most `min_area` pixels.
///
/// Every black (0) pixel is labelled into a component; components with a pixel
/// count `<= min_area` are repainted white and the rest stay solid black.
/// Non-black pixels are left as they are.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn component_area_denoise(
    image: &GrayImage,
    min_area: u32,
    connectivity: Connectivity,
) -> GrayImage {
    let ink_mask = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([if image.get_pixel(x, y).0[0] == INK { 255 } else { 0 }])
    });

    let labels = connected_components(&ink_mask, connectivity_of(connectivity), Luma([0u8]));

    let label_count = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    let mut areas = vec![0u32; label_count + 1];
    for label in labels.pixels() {
        areas[label.0[0] as usize] += 1;
    }

    let mut out = image.clone();
    let mut erased = 0usize;
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label != 0 && areas[label] <= min_area {
            out.put_pixel(x, y, Luma([PAPER]));
            erased += 1;
        }
    }

    debug!(
        components = label_count,
        erased_pixels = erased,
        "Component area filter complete"
    );
    out
}

fn connectivity_of(connectivity: Connectivity) -> region_labelling::Connectivity {
    match connectivity {
        Connectivity::Four => region_labelling::Connectivity::Four,
        Connectivity::Eight => region_labelling::Connectivity::Eight,
    }
}
