// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end behaviour of the public pipeline API on synthetic pages.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use scanprep_core::config::{Connectivity, PipelineConfig};
use scanprep_core::types::{BoundingRect, Extremes, Point, SkewAngle};
use scanprep_imaging::scan::denoise::component_area_denoise;
use scanprep_imaging::scan::geometry::shear;
use scanprep_imaging::scan::skew::{estimate_skew, prepare_edge_map};
use scanprep_imaging::{RasterFormat, ScanPreprocessor};

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);

fn blank(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, WHITE)
}

/// A thick stroke with round caps from `start`, `length` pixels long, tilted
/// `degrees` clockwise from the x axis in image coordinates.
fn stroke(page: &mut GrayImage, start: (f64, f64), length: f64, degrees: f64, radius: i32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let steps = length.round() as i32;
    for step in 0..=steps {
        let t = f64::from(step);
        let center = (
            (start.0 + t * cos).round() as i32,
            (start.1 + t * sin).round() as i32,
        );
        draw_filled_circle_mut(page, center, radius, BLACK);
    }
}

// -- Component filtering ------------------------------------------------------

#[test]
fn isolated_square_is_erased_by_component_filter() {
    let mut page = blank(20, 20);
    for y in 8..11 {
        for x in 8..11 {
            page.put_pixel(x, y, BLACK);
        }
    }

    let cleaned = component_area_denoise(&page, 9, Connectivity::Four);
    assert!(cleaned.pixels().all(|p| *p == WHITE));
}

#[test]
fn component_filter_keeps_text_sized_strokes() {
    let mut page = blank(40, 40);
    for x in 5..35 {
        page.put_pixel(x, 20, BLACK);
    }
    page.put_pixel(2, 2, BLACK);

    let cleaned = component_area_denoise(&page, 9, Connectivity::Eight);
    assert_eq!(*cleaned.get_pixel(2, 2), WHITE);
    assert!((5..35).all(|x| *cleaned.get_pixel(x, 20) == BLACK));
}

// -- Skew ---------------------------------------------------------------------

/// A single tilted stroke sets the skew angle.
#[test]
fn tilted_stroke_measures_ten_degrees() {
    let mut page = blank(800, 360);
    stroke(&mut page, (90.0, 70.0), 620.0, 10.0, 5);

    let config = PipelineConfig::default();
    let stages = prepare_edge_map(&page, &config);
    let estimate = estimate_skew(&stages.filtered, &config);

    assert!(estimate.lines_detected > 0);
    assert!(
        (estimate.angle.degrees() - 10.0).abs() <= 1.0,
        "measured {}",
        estimate.angle
    );
}

#[test]
fn deskew_reports_the_applied_angle() {
    let mut page = blank(800, 360);
    stroke(&mut page, (90.0, 70.0), 620.0, 10.0, 5);

    let outcome = ScanPreprocessor::default()
        .deskew(&DynamicImage::ImageLuma8(page))
        .expect("deskew");

    assert!(!outcome.skew_defaulted());
    assert!((outcome.angle.degrees() - 10.0).abs() <= 1.0);
    assert!(outcome.angle.degrees() >= 0.0 && outcome.angle.degrees() < 90.0);
}

/// Nothing survives filtering, so the page comes back untouched.
#[test]
fn page_without_segments_is_returned_unchanged() {
    let mut page = blank(160, 120);
    for (x, y) in [(20, 30), (90, 40), (130, 100)] {
        page.put_pixel(x, y, BLACK);
    }
    let original = DynamicImage::ImageLuma8(page);

    let outcome = ScanPreprocessor::default().deskew(&original).expect("deskew");

    assert_eq!(outcome.angle, SkewAngle::ZERO);
    assert_eq!(outcome.lines_detected, 0);
    assert!(!outcome.is_cropped());
    assert_eq!(outcome.image, original);
}

#[test]
fn deskew_bytes_round_trips_through_png() {
    let page = GrayImage::from_pixel(64, 48, Luma([240]));
    let bytes = scanprep_imaging::raster::encode_gray(&page, RasterFormat::Png).expect("encode");

    let (out, outcome) = ScanPreprocessor::default()
        .deskew_bytes(&bytes, RasterFormat::Png)
        .expect("deskew");

    assert!(outcome.skew_defaulted());
    let decoded = scanprep_imaging::raster::decode(&out).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
}

// -- Crop ---------------------------------------------------------------------

/// Outline of a `width` x `height` rectangle centred on `center`, turned
/// `degrees` clockwise in image coordinates.
fn tilted_frame(page: &mut GrayImage, center: (f64, f64), width: f64, height: f64, degrees: f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let corner = |dx: f64, dy: f64| (center.0 + dx * cos - dy * sin, center.1 + dx * sin + dy * cos);
    let (hw, hh) = (width / 2.0, height / 2.0);

    stroke(page, corner(-hw, -hh), width, degrees, 4);
    stroke(page, corner(hw, -hh), height, degrees + 90.0, 4);
    stroke(page, corner(hw, hh), width, degrees + 180.0, 4);
    stroke(page, corner(-hw, hh), height, degrees + 270.0, 4);
}

/// A tilted page outline is straightened, then cropped to just inside the
/// straightened outline.
#[test]
fn tilted_frame_is_deskewed_and_cropped() {
    let mut page = blank(900, 700);
    tilted_frame(&mut page, (450.0, 350.0), 500.0, 400.0, 8.0);

    let outcome = ScanPreprocessor::default()
        .deskew(&DynamicImage::ImageLuma8(page))
        .expect("deskew");

    assert!((outcome.angle.degrees() - 8.0).abs() <= 1.0, "measured {}", outcome.angle);
    assert!(outcome.is_cropped());
    assert!(outcome.boundary_segments > 0);

    let (width, height) = (outcome.image.width(), outcome.image.height());
    assert!((470..=515).contains(&width), "width {width}");
    assert!((370..=415).contains(&height), "height {height}");
}

/// A boundary reaching past the raster is clamped, never read out of bounds.
#[test]
fn crop_is_clamped_to_raster() {
    let page = DynamicImage::ImageLuma8(blank(100, 80));
    let extremes = Extremes::of([Point::new(30.0, 20.0), Point::new(400.0, 70.0)])
        .expect("two points");
    let rect = BoundingRect::inset(&extremes, 0.0);

    let cropped = shear(&page, &rect).expect("crop");
    assert_eq!((cropped.width(), cropped.height()), (70, 50));
}

#[test]
fn crop_outside_raster_is_skipped() {
    let page = DynamicImage::ImageLuma8(blank(100, 80));
    let extremes = Extremes::of([Point::new(120.0, 10.0), Point::new(160.0, 40.0)])
        .expect("two points");
    assert!(shear(&page, &BoundingRect::inset(&extremes, 0.0)).is_none());
}

// -- Simple path --------------------------------------------------------------

#[test]
fn preprocess_keeps_dimensions_and_drops_specks() {
    let mut page = blank(50, 40);
    page.put_pixel(25, 20, BLACK);

    let out = ScanPreprocessor::default()
        .preprocess(&DynamicImage::ImageLuma8(page))
        .expect("preprocess");

    assert_eq!(out.dimensions(), (50, 40));
    assert_ne!(*out.get_pixel(25, 20), BLACK);
}
