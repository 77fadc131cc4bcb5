// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region filter — contour extraction and suppression of small regions on edge
// maps (foreground non-zero, background 0).

use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::drawing::draw_polygon_mut;
use imageproc::geometry::min_area_rect;
use imageproc::point::Point as PixelPoint;
use scanprep_core::types::{Contour, Point};
use tracing::{debug, instrument};

/// Fill value for suppressed regions.
pub const BACKGROUND: Luma<u8> = Luma([0]);

/// Trace the border of every foreground region, outer borders and hole
/// borders alike, as a flat list.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn extract_contours(image: &GrayImage) -> Vec<Contour> {
    let contours: Vec<Contour> = find_contours::<i32>(image)
        .into_iter()
        .filter(|contour| !contour.points.is_empty())
        .map(|contour| {
            let corners = min_area_rect(&contour.points).map(to_point);
            Contour {
                points: contour.points.into_iter().map(to_point).collect(),
                corners,
            }
        })
        .collect();

    debug!(count = contours.len(), "Contours extracted");
    contours
}

/// Paint every contour whose rotated bounding rectangle covers less than
/// `min_area` with the background value, interior included.
#[instrument(skip(image, contours), fields(contours = contours.len(), min_area))]
pub fn suppress_small_contours(image: &mut GrayImage, contours: &[Contour], min_area: f64) {
    let mut suppressed = 0usize;
    for contour in contours.iter().filter(|c| c.bounding_area() < min_area) {
        fill_contour(image, contour);
        suppressed += 1;
    }
    debug!(suppressed, "Small contours suppressed");
}

fn fill_contour(image: &mut GrayImage, contour: &Contour) {
    let mut polygon: Vec<PixelPoint<i32>> = contour
        .points
        .iter()
        .map(|p| PixelPoint::new(p.x as i32, p.y as i32))
        .collect();
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    if polygon.len() >= 3 {
        draw_polygon_mut(image, &polygon, BACKGROUND);
    }

    // The border pixels belong to the region too.
    let (width, height) = image.dimensions();
    for p in &contour.points {
        let (x, y) = (p.x as i64, p.y as i64);
        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
            image.put_pixel(x as u32, y as u32, BACKGROUND);
        }
    }
}

fn to_point(p: PixelPoint<i32>) -> Point {
    Point::new(p.x as f64, p.y as f64)
}
