// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orchestrator — composes the stages into the two pipelines: the simple
// recognition preprocess and the deskew-and-crop path.

use image::{DynamicImage, GrayImage};
use scanprep_core::config::PipelineConfig;
use scanprep_core::error::Result;
use scanprep_core::types::{BoundingRect, SkewAngle};
use tracing::{info, instrument, warn};

use super::debug::DebugSink;
use super::denoise::{component_area_denoise, neighborhood_denoise};
use super::geometry::{detect_boundary, rotate, rotate_gray, shear};
use super::skew::{estimate_skew, prepare_edge_map};
use super::tonal::{gaussian_blur, grayscale};
use crate::raster::{self, RasterFormat, ensure_geometry};

/// What the deskew path did to a page.
#[derive(Debug, Clone)]
pub struct DeskewOutcome {
    /// Rotated (and, when a boundary was found, cropped) page at the
    /// original resolution.
    pub image: DynamicImage,
    /// Applied correction; zero when no segments were detected.
    pub angle: SkewAngle,
    /// Segments found while measuring skew.
    pub lines_detected: usize,
    /// Axis-aligned segments found on the rotated page.
    pub boundary_segments: usize,
    /// Crop boundary, or `None` when cropping was skipped.
    pub crop: Option<BoundingRect>,
}

impl DeskewOutcome {
    pub fn is_cropped(&self) -> bool {
        self.crop.is_some()
    }

    /// True when no segment was found to measure skew against.
    pub fn skew_defaulted(&self) -> bool {
        self.lines_detected == 0
    }
}

/// Runs the normalization pipelines with one fixed, read-only configuration.
///
/// Holds no per-invocation state, so one instance can serve many pages,
/// including from several threads at once.
///
/// ```ignore
/// let prep = ScanPreprocessor::new(PipelineConfig::default())?
///     .with_debug_sink(DebugSink::Directory("steps".into()));
/// let clean = prep.preprocess(&raster::open("page.jpg")?)?;
/// let upright = prep.deskew(&raster::open("page.jpg")?)?.image;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScanPreprocessor {
    config: PipelineConfig,
    debug: DebugSink,
}

impl ScanPreprocessor {
    // -- Construction ---------------------------------------------------------

    /// Create a preprocessor after validating `config`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            debug: DebugSink::Disabled,
        })
    }

    /// Send intermediate rasters to `sink`.
    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug = sink;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // -- Simple path ----------------------------------------------------------

    /// Grayscale, Gaussian blur, one neighbourhood denoise pass, then the
    /// component area filter when `denoise.min_component_area` is non-zero.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn preprocess(&self, image: &DynamicImage) -> Result<GrayImage> {
        ensure_geometry(image.width(), image.height())?;
        info!(
            debug_artifacts = self.debug.is_enabled(),
            "Running recognition preprocess"
        );

        let gray = grayscale(image);
        self.debug.emit("01_grayscale.png", &gray);

        let blurred = gaussian_blur(&gray, self.config.tonal.blur_kernel);
        self.debug.emit("02_blur.png", &blurred);

        let denoised = neighborhood_denoise(
            &blurred,
            self.config.denoise.isolation_threshold,
            self.config.denoise.fill_threshold,
        );
        self.debug.emit("03_denoise.png", &denoised);

        if self.config.denoise.min_component_area == 0 {
            return Ok(denoised);
        }
        let filtered = self.remove_small_components(&denoised);
        self.debug.emit("04_components.png", &filtered);
        Ok(filtered)
    }

    /// Erase black components of at most `denoise.min_component_area` pixels,
    /// labelled with `denoise.connectivity`.
    pub fn remove_small_components(&self, image: &GrayImage) -> GrayImage {
        component_area_denoise(
            image,
            self.config.denoise.min_component_area,
            self.config.denoise.connectivity,
        )
    }

    /// Decode, preprocess and re-encode.
    pub fn preprocess_bytes(&self, data: &[u8], format: RasterFormat) -> Result<Vec<u8>> {
        let image = raster::decode(data)?;
        let cleaned = self.preprocess(&image)?;
        raster::encode_gray(&cleaned, format)
    }

    // -- Deskew path ----------------------------------------------------------

    /// Deskew and crop `original`, detecting on a grayscale copy of itself.
    pub fn deskew(&self, original: &DynamicImage) -> Result<DeskewOutcome> {
        self.deskew_with_working(original, original)
    }

    /// Deskew and crop `original`, measuring skew and boundary on `working`.
    ///
    /// Both rasters are rotated by the same angle, so they should share
    /// dimensions for the crop box to line up.
    ///
    /// Neither documented fallback is an error: without segments the angle is
    /// 0, and a boundary touching the raster edge leaves the rotated page
    /// uncropped. [`DeskewOutcome`] records which happened.
    #[instrument(skip_all, fields(width = original.width(), height = original.height()))]
    pub fn deskew_with_working(
        &self,
        original: &DynamicImage,
        working: &DynamicImage,
    ) -> Result<DeskewOutcome> {
        ensure_geometry(original.width(), original.height())?;
        ensure_geometry(working.width(), working.height())?;
        info!(
            debug_artifacts = self.debug.is_enabled(),
            "Running deskew pipeline"
        );

        let gray = grayscale(working);
        let stages = prepare_edge_map(&gray, &self.config);
        self.debug.emit("skew_01_binary.png", &stages.binary);
        self.debug.emit("skew_02_edges.png", &stages.edges);
        self.debug.emit("skew_03_filtered.png", &stages.filtered);

        let estimate = estimate_skew(&stages.filtered, &self.config);
        let degrees = estimate.angle.degrees();

        let rotated_edges = rotate_gray(&stages.filtered, degrees);
        let rotated = rotate(original, degrees);
        self.debug.emit("skew_04_rotated.png", &rotated_edges);

        let (boundary, boundary_segments) = detect_boundary(&rotated_edges, &self.config.crop);
        let cropped = boundary.and_then(|rect| shear(&rotated, &rect).map(|img| (img, rect)));

        let outcome = match cropped {
            Some((image, rect)) => {
                info!(
                    angle = degrees,
                    width = image.width(),
                    height = image.height(),
                    "Page deskewed and cropped"
                );
                DeskewOutcome {
                    image,
                    angle: estimate.angle,
                    lines_detected: estimate.lines_detected,
                    boundary_segments,
                    crop: Some(rect),
                }
            }
            None => {
                warn!(
                    angle = degrees,
                    boundary_segments, "No usable boundary; returning rotated page uncropped"
                );
                DeskewOutcome {
                    image: rotated,
                    angle: estimate.angle,
                    lines_detected: estimate.lines_detected,
                    boundary_segments,
                    crop: None,
                }
            }
        };

        Ok(outcome)
    }

    /// Decode, deskew and re-encode.
    pub fn deskew_bytes(&self, data: &[u8], format: RasterFormat) -> Result<(Vec<u8>, DeskewOutcome)> {
        let image = raster::decode(data)?;
        let outcome = self.deskew(&image)?;
        let bytes = raster::encode(&outcome.image, format)?;
        Ok((bytes, outcome))
    }
}
