// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometry types for the Scanprep normalization pipeline.
//
// All values here are created and dropped within one pipeline invocation; none
// of them carry ownership of raster data.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A real-valued (x, y) coordinate in raster space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A coordinate axis, used to order points for min/max extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The coordinate of `point` along this axis.
    pub fn key(self, point: &Point) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    }

    /// Total ordering of two points along this axis.
    pub fn compare(self, a: &Point, b: &Point) -> Ordering {
        self.key(a).total_cmp(&self.key(b))
    }

    /// Sort `points` ascending along this axis (stable).
    pub fn sort(self, points: &mut [Point]) {
        points.sort_by(|a, b| self.compare(a, b));
    }
}

/// Axis-aligned extremes of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extremes {
    /// Compute the extremes of `points`, or `None` when the set is empty.
    pub fn of(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    min_x: p.x,
                    min_y: p.y,
                    max_x: p.x,
                    max_y: p.y,
                },
                Some(e) => Self {
                    min_x: e.min_x.min(p.x),
                    min_y: e.min_y.min(p.y),
                    max_x: e.max_x.max(p.x),
                    max_y: e.max_y.max(p.y),
                },
            })
        })
    }

    /// True when the box lies strictly inside a `cols` x `rows` raster.
    pub fn strictly_inside(&self, cols: u32, rows: u32) -> bool {
        self.max_x < cols as f64 && self.min_x > 0.0 && self.max_y < rows as f64 && self.min_y > 0.0
    }
}

/// A detected straight segment between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// The degenerate segment (0,0)-(0,0), used when nothing was detected.
    pub const fn degenerate() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0))
    }

    pub fn dx(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn dy(&self) -> f64 {
        self.end.y - self.start.y
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.dx() * self.dx() + self.dy() * self.dy()).sqrt()
    }

    /// Orientation relative to the horizontal axis, in degrees, before any
    /// normalization.
    ///
    /// `acos(dx / hypot)` signed by `dy`, with exactly 180° for a horizontal
    /// segment pointing left. A zero-length segment has orientation 0°.
    pub fn raw_angle_degrees(&self) -> f64 {
        let dx = self.dx();
        let dy = self.dy();
        let hypotenuse = (dx * dx + dy * dy).sqrt();
        if hypotenuse == 0.0 {
            return 0.0;
        }

        let mut angle = (dx / hypotenuse).clamp(-1.0, 1.0).acos().to_degrees();
        if dy < 0.0 {
            angle = -angle;
        } else if dy == 0.0 && dx < 0.0 {
            angle = 180.0;
        }
        angle
    }

    /// Roughly parallel to the x axis: endpoints within `tolerance` rows and
    /// spanning more than `min_span` columns.
    pub fn is_near_horizontal(&self, tolerance: f64, min_span: f64) -> bool {
        self.dy().abs() < tolerance && self.dx().abs() > min_span
    }

    /// Roughly parallel to the y axis: endpoints within `tolerance` columns and
    /// spanning more than `min_span` rows.
    pub fn is_near_vertical(&self, tolerance: f64, min_span: f64) -> bool {
        self.dx().abs() < tolerance && self.dy().abs() > min_span
    }

    /// Both endpoints.
    pub fn endpoints(&self) -> [Point; 2] {
        [self.start, self.end]
    }
}

/// Pick the longest segment; ties keep the earliest. Falls back to the
/// degenerate segment when `segments` is empty.
pub fn longest_segment(segments: &[LineSegment]) -> LineSegment {
    segments
        .iter()
        .fold(LineSegment::degenerate(), |best, candidate| {
            if candidate.length() > best.length() {
                *candidate
            } else {
                best
            }
        })
}

/// A skew correction angle in degrees, always within `[0, 90)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct SkewAngle(f64);

impl SkewAngle {
    pub const ZERO: SkewAngle = SkewAngle(0.0);

    /// Fold a raw orientation into `[0, 90)`.
    ///
    /// Negative inputs gain whole multiples of 90°; inputs at or above 90° lose
    /// them. Non-finite inputs collapse to zero.
    pub fn from_raw_degrees(raw: f64) -> Self {
        if !raw.is_finite() {
            return Self::ZERO;
        }
        let folded = raw.rem_euclid(90.0);
        // rem_euclid can round up to exactly 90.0 for tiny negative inputs.
        if folded >= 90.0 {
            Self::ZERO
        } else {
            Self(folded)
        }
    }

    /// Angle of a segment, normalized.
    pub fn of_segment(segment: &LineSegment) -> Self {
        Self::from_raw_degrees(segment.raw_angle_degrees())
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl std::fmt::Display for SkewAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}°", self.0)
    }
}

/// Integer crop rectangle inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Four corners delimiting the document region inside a rotated raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub corners: [Point; 4],
}

impl BoundingRect {
    /// Corners pulled `margin` pixels inwards from `extremes` on every side.
    pub fn inset(extremes: &Extremes, margin: f64) -> Self {
        Self {
            corners: [
                Point::new(extremes.min_x + margin, extremes.min_y + margin),
                Point::new(extremes.min_x + margin, extremes.max_y - margin),
                Point::new(extremes.max_x - margin, extremes.min_y + margin),
                Point::new(extremes.max_x - margin, extremes.max_y - margin),
            ],
        }
    }

    /// Integer crop window for a `cols` x `rows` raster.
    ///
    /// The origin is the smallest corner coordinate (absolute value, truncated)
    /// and the extent is the corner span, clamped so that the window never runs
    /// past the raster edge. Returns `None` when the window would be empty.
    pub fn crop_window(&self, cols: u32, rows: u32) -> Option<CropWindow> {
        let mut points = self.corners;

        Axis::X.sort(&mut points);
        let x = points[0].x.abs().trunc();
        let span_x = (points[3].x - points[0].x).trunc();

        Axis::Y.sort(&mut points);
        let y = points[0].y.abs().trunc();
        let span_y = (points[3].y - points[0].y).trunc();

        if x >= cols as f64 || y >= rows as f64 || span_x <= 0.0 || span_y <= 0.0 {
            return None;
        }

        let x = x as u32;
        let y = y as u32;
        let width = (span_x.min(u32::MAX as f64) as u32).min(cols - x);
        let height = (span_y.min(u32::MAX as f64) as u32).min(rows - y);

        Some(CropWindow {
            x,
            y,
            width,
            height,
        })
    }
}

/// One connected foreground region's boundary, with its minimal rotated
/// bounding rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Boundary points in traversal order.
    pub points: Vec<Point>,
    /// Corners of the minimal-area rotated rectangle enclosing `points`.
    pub corners: [Point; 4],
}

impl Contour {
    /// Corners of the minimal rotated bounding rectangle.
    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    /// Area of the upright integer rectangle enclosing the rotated rectangle.
    ///
    /// Width is `ceil(max x) - floor(min x) + 1`, likewise for height, so a
    /// single-pixel contour has area 1.
    pub fn bounding_area(&self) -> f64 {
        match Extremes::of(self.corners) {
            Some(e) => {
                let width = e.max_x.ceil() - e.min_x.floor() + 1.0;
                let height = e.max_y.ceil() - e.min_y.floor() + 1.0;
                width * height
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn raw_angle_of_degenerate_segment_is_zero() {
        assert_eq!(LineSegment::degenerate().raw_angle_degrees(), 0.0);
        assert_eq!(SkewAngle::of_segment(&LineSegment::degenerate()), SkewAngle::ZERO);
    }

    #[test]
    fn raw_angle_signs() {
        assert!((segment(0.0, 0.0, 10.0, 10.0).raw_angle_degrees() - 45.0).abs() < 1e-9);
        assert!((segment(0.0, 0.0, 10.0, -10.0).raw_angle_degrees() + 45.0).abs() < 1e-9);
        assert_eq!(segment(10.0, 5.0, 0.0, 5.0).raw_angle_degrees(), 180.0);
    }

    /// A segment pointing up-right at -10° folds to 80°; its reverse at -170°
    /// folds to 10°.
    #[test]
    fn skew_angle_folds_negative_angles() {
        assert!((SkewAngle::from_raw_degrees(-10.0).degrees() - 80.0).abs() < 1e-9);
        assert!((SkewAngle::from_raw_degrees(-170.0).degrees() - 10.0).abs() < 1e-9);
        assert!((SkewAngle::from_raw_degrees(10.0).degrees() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn skew_angle_range_holds_for_sweep() {
        let mut raw = -180.0;
        while raw <= 180.0 {
            let folded = SkewAngle::from_raw_degrees(raw).degrees();
            assert!((0.0..90.0).contains(&folded), "raw {raw} folded to {folded}");
            if raw < 90.0 {
                let steps = (folded - raw) / 90.0;
                assert!(steps >= -1e-9, "raw {raw} needs {steps} steps");
                assert!((steps - steps.round()).abs() < 1e-9);
            }
            raw += 0.25;
        }
    }

    #[test]
    fn skew_angle_non_finite_is_zero() {
        assert_eq!(SkewAngle::from_raw_degrees(f64::NAN), SkewAngle::ZERO);
        assert_eq!(SkewAngle::from_raw_degrees(f64::INFINITY), SkewAngle::ZERO);
    }

    #[test]
    fn longest_segment_keeps_first_on_tie() {
        let first = segment(0.0, 0.0, 3.0, 4.0);
        let second = segment(10.0, 10.0, 13.0, 14.0);
        let shorter = segment(0.0, 0.0, 1.0, 1.0);
        assert_eq!(longest_segment(&[shorter, first, second]), first);
        assert_eq!(longest_segment(&[]), LineSegment::degenerate());
    }

    #[test]
    fn near_horizontal_and_vertical_buckets() {
        assert!(segment(0.0, 10.0, 40.0, 13.0).is_near_horizontal(5.0, 20.0));
        assert!(!segment(0.0, 10.0, 15.0, 13.0).is_near_horizontal(5.0, 20.0));
        assert!(segment(7.0, 0.0, 9.0, 50.0).is_near_vertical(5.0, 20.0));
        assert!(!segment(0.0, 0.0, 30.0, 30.0).is_near_vertical(5.0, 20.0));
    }

    #[test]
    fn extremes_and_strict_containment() {
        let e = Extremes::of([Point::new(5.0, 7.0), Point::new(50.0, 2.0), Point::new(20.0, 90.0)])
            .expect("non-empty");
        assert_eq!((e.min_x, e.min_y, e.max_x, e.max_y), (5.0, 2.0, 50.0, 90.0));
        assert!(e.strictly_inside(100, 100));
        assert!(!e.strictly_inside(50, 100));
        assert!(Extremes::of(Vec::new()).is_none());
    }

    #[test]
    fn inset_rect_crop_window() {
        let e = Extremes {
            min_x: 20.0,
            min_y: 30.0,
            max_x: 120.0,
            max_y: 90.0,
        };
        let window = BoundingRect::inset(&e, 10.0)
            .crop_window(200, 200)
            .expect("window");
        assert_eq!(
            window,
            CropWindow {
                x: 30,
                y: 40,
                width: 80,
                height: 40
            }
        );
    }

    /// Whatever the extremes and margin, the window never runs past the raster.
    #[test]
    fn crop_window_never_exceeds_raster() {
        let (cols, rows) = (64u32, 48u32);
        for min_x in [-30.0, 0.0, 3.5, 40.0, 70.0] {
            for max_x in [10.0, 63.0, 200.0] {
                for margin in [-15.0, 0.0, 10.0] {
                    let e = Extremes {
                        min_x,
                        min_y: min_x / 2.0,
                        max_x,
                        max_y: max_x,
                    };
                    if let Some(w) = BoundingRect::inset(&e, margin).crop_window(cols, rows) {
                        assert!(w.width <= cols - w.x);
                        assert!(w.height <= rows - w.y);
                        assert!(w.width > 0 && w.height > 0);
                    }
                }
            }
        }
    }

    #[test]
    fn contour_bounding_area_of_single_pixel() {
        let p = Point::new(4.0, 4.0);
        let contour = Contour {
            points: vec![p],
            corners: [p; 4],
        };
        assert_eq!(contour.bounding_area(), 1.0);
    }

    #[test]
    fn axis_sort_orders_points() {
        let mut points = [Point::new(3.0, 1.0), Point::new(1.0, 5.0), Point::new(2.0, 0.0)];
        Axis::X.sort(&mut points);
        assert_eq!(points[0].x, 1.0);
        Axis::Y.sort(&mut points);
        assert_eq!(points[0].y, 0.0);
    }
}
