// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progressive probabilistic Hough transform — detects line segments (with
// endpoints) in an edge map.
//
// `imageproc::hough` only reports infinite polar lines, which is not enough to
// bound a document or measure segment length. This detector samples edge
// pixels in random order, votes them into a (theta, rho) accumulator, and as
// soon as a bin reaches the vote threshold walks the corresponding line in both
// directions to find the segment's endpoints, bridging gaps of up to
// `max_line_gap` pixels. Pixels on an accepted segment are withdrawn from the
// accumulator so each edge pixel contributes to at most one segment.
//
// The random order is seeded with a fixed value, so results are deterministic.

use image::GrayImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scanprep_core::config::HoughConfig;
use scanprep_core::types::{LineSegment, Point};
use tracing::{debug, instrument};

const RNG_SEED: u64 = u64::MAX;

/// Fixed-point precision for walking along a line.
const SHIFT: u32 = 16;

/// Detect straight segments among the non-zero pixels of `edges`.
///
/// Segments are returned in detection order. Each segment's `start` lies at
/// the end reached walking along `(-sin theta, cos theta)`.
#[instrument(skip(edges, config), fields(
    width = edges.width(),
    height = edges.height(),
    threshold = config.threshold,
    min_line_length = config.min_line_length,
    max_line_gap = config.max_line_gap,
))]
pub fn detect_segments(edges: &GrayImage, config: &HoughConfig) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    if width == 0 || height == 0 || config.rho <= 0.0 || config.theta <= 0.0 {
        return Vec::new();
    }

    let accumulator = Accumulator::new(width, height, config.rho, config.theta);
    let mut detector = Detector {
        width: width as i64,
        height: height as i64,
        mask: edges.pixels().map(|p| p.0[0] != 0).collect(),
        accumulator,
    };

    let mut candidates: Vec<(i64, i64)> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] != 0)
        .map(|(x, y, _)| (x as i64, y as i64))
        .collect();
    let edge_pixels = candidates.len();

    let threshold = config.threshold.max(1) as i32;
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let mut segments = Vec::new();

    while !candidates.is_empty() {
        let pick = rng.random_range(0..candidates.len());
        let (x, y) = candidates.swap_remove(pick);

        // Already consumed by an earlier segment.
        if !detector.is_set(x, y) {
            continue;
        }

        let (votes, best_angle) = detector.accumulator.vote(x, y);
        if votes < threshold {
            continue;
        }

        let walk = Walk::along(&detector.accumulator, best_angle, x, y);
        let ends = [
            detector.find_end(&walk, false, config.max_line_gap),
            detector.find_end(&walk, true, config.max_line_gap),
        ];

        let accepted = (ends[1].0 - ends[0].0).abs() as f64 >= config.min_line_length
            || (ends[1].1 - ends[0].1).abs() as f64 >= config.min_line_length;

        detector.consume(&walk, false, ends[0], accepted);
        detector.consume(&walk, true, ends[1], accepted);

        if accepted {
            segments.push(LineSegment::new(
                Point::new(ends[0].0 as f64, ends[0].1 as f64),
                Point::new(ends[1].0 as f64, ends[1].1 as f64),
            ));
        }
    }

    debug!(edge_pixels, segments = segments.len(), "Probabilistic Hough complete");
    segments
}

// -- Accumulator --------------------------------------------------------------

struct Accumulator {
    angles: usize,
    rhos: usize,
    /// (cos, sin) per angle bin, pre-divided by rho.
    trig: Vec<(f64, f64)>,
    votes: Vec<i32>,
}

impl Accumulator {
    fn new(width: u32, height: u32, rho: f64, theta: f64) -> Self {
        let angles = ((std::f64::consts::PI / theta).round_ties_even() as usize).max(1);
        let rhos = ((((width + height) as f64) * 2.0 + 1.0) / rho).round_ties_even() as usize;
        let inv_rho = 1.0 / rho;
        let trig = (0..angles)
            .map(|n| {
                let angle = n as f64 * theta;
                (angle.cos() * inv_rho, angle.sin() * inv_rho)
            })
            .collect();
        Self {
            angles,
            rhos: rhos.max(1),
            trig,
            votes: vec![0; angles * rhos.max(1)],
        }
    }

    fn rho_index(&self, n: usize, x: i64, y: i64) -> usize {
        let (cos, sin) = self.trig[n];
        let r = (x as f64 * cos + y as f64 * sin).round_ties_even() as i64
            + (self.rhos as i64 - 1) / 2;
        r.clamp(0, self.rhos as i64 - 1) as usize
    }

    /// Add the votes of (x, y) and return the strongest bin's count and angle.
    fn vote(&mut self, x: i64, y: i64) -> (i32, usize) {
        let mut best = (i32::MIN, 0usize);
        for n in 0..self.angles {
            let idx = n * self.rhos + self.rho_index(n, x, y);
            self.votes[idx] += 1;
            if self.votes[idx] > best.0 {
                best = (self.votes[idx], n);
            }
        }
        best
    }

    fn withdraw(&mut self, x: i64, y: i64) {
        for n in 0..self.angles {
            let idx = n * self.rhos + self.rho_index(n, x, y);
            self.votes[idx] -= 1;
        }
    }
}

// -- Line walking -------------------------------------------------------------

/// Fixed-point stepping along a line through a seed pixel.
///
/// The major axis advances one pixel per step; the minor axis carries
/// `SHIFT` fractional bits.
struct Walk {
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl Walk {
    fn along(accumulator: &Accumulator, angle: usize, x: i64, y: i64) -> Self {
        let (cos, sin) = accumulator.trig[angle];
        let a = -sin;
        let b = cos;
        let one = (1i64 << SHIFT) as f64;
        let half = 1i64 << (SHIFT - 1);

        if a.abs() > b.abs() {
            Self {
                x0: x,
                y0: (y << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one / a.abs()).round_ties_even() as i64,
                x_major: true,
            }
        } else {
            Self {
                x0: (x << SHIFT) + half,
                y0: y,
                dx: (a * one / b.abs()).round_ties_even() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    fn pixel(&self, x: i64, y: i64) -> (i64, i64) {
        if self.x_major {
            (x, y >> SHIFT)
        } else {
            (x >> SHIFT, y)
        }
    }

    fn step(&self, backwards: bool) -> (i64, i64) {
        if backwards {
            (-self.dx, -self.dy)
        } else {
            (self.dx, self.dy)
        }
    }
}

struct Detector {
    width: i64,
    height: i64,
    mask: Vec<bool>,
    accumulator: Accumulator,
}

impl Detector {
    fn inside(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn is_set(&self, x: i64, y: i64) -> bool {
        self.mask[(y * self.width + x) as usize]
    }

    /// Last set pixel before the gap along the walk exceeds `max_gap`.
    fn find_end(&self, walk: &Walk, backwards: bool, max_gap: u32) -> (i64, i64) {
        let (dx, dy) = walk.step(backwards);
        let (mut x, mut y) = (walk.x0, walk.y0);
        let mut end = walk.pixel(x, y);
        let mut gap = 0u32;

        loop {
            let (px, py) = walk.pixel(x, y);
            if !self.inside(px, py) {
                break;
            }
            if self.is_set(px, py) {
                gap = 0;
                end = (px, py);
            } else {
                gap += 1;
                if gap > max_gap {
                    break;
                }
            }
            x += dx;
            y += dy;
        }
        end
    }

    /// Clear the walk's pixels up to `end`; withdraw their votes when the
    /// segment was accepted.
    fn consume(&mut self, walk: &Walk, backwards: bool, end: (i64, i64), accepted: bool) {
        let (dx, dy) = walk.step(backwards);
        let (mut x, mut y) = (walk.x0, walk.y0);

        loop {
            let (px, py) = walk.pixel(x, y);
            if !self.inside(px, py) {
                break;
            }
            let idx = (py * self.width + px) as usize;
            if self.mask[idx] {
                if accepted {
                    self.accumulator.withdraw(px, py);
                }
                self.mask[idx] = false;
            }
            if (px, py) == end {
                break;
            }
            x += dx;
            y += dy;
        }
    }
}
