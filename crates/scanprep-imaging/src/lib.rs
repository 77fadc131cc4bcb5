// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanprep-imaging — Geometric and tonal normalization of photographed or
// scanned document pages.
//
// Provides raster decode/encode, the stage operations (grayscale, blur,
// adaptive binarization, neighbourhood and component denoising, contour
// filtering, probabilistic Hough segment detection, rotation, cropping), the
// two pipelines built from them, and the text recognition boundary.

pub mod raster;
pub mod scan;
pub mod service;

// Re-export the primary types so callers can use `scanprep_imaging::ScanPreprocessor` etc.
pub use raster::RasterFormat;
pub use scan::debug::DebugSink;
pub use scan::pipeline::{DeskewOutcome, ScanPreprocessor};
pub use service::{RecognitionResult, TextRecognizer, extract_text};

#[cfg(feature = "ocr")]
pub use scan::ocr::{OcrConfig, OcrEngine};
