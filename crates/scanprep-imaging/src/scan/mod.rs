// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page normalization stages and the pipelines that compose them.

pub mod debug;
pub mod denoise;
pub mod geometry;
pub mod hough;
pub mod pipeline;
pub mod region;
pub mod skew;
pub mod tonal;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use pipeline::{DeskewOutcome, ScanPreprocessor};

#[cfg(feature = "ocr")]
pub use ocr::OcrEngine;
