// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.
//
// Every field has a default matching the tuned constants of the normalization
// pipeline, so an empty JSON object is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanPrepError};

/// Complete set of tunables for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tonal: TonalConfig,
    pub denoise: DenoiseConfig,
    pub skew: SkewConfig,
    pub crop: CropConfig,
}

/// Blur, binarization and edge-detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TonalConfig {
    /// Side of the square Gaussian kernel (odd, >= 1).
    pub blur_kernel: u32,
    /// Side of the adaptive-threshold neighbourhood (odd, >= 3).
    pub binarize_block: u32,
    /// Constant subtracted from the local mean before thresholding.
    pub binarize_bias: f32,
    /// Canny low hysteresis threshold.
    pub canny_low: f32,
    /// Canny high hysteresis threshold.
    pub canny_high: f32,
}

impl Default for TonalConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 3,
            binarize_block: 25,
            binarize_bias: 10.0,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

/// Noise-removal parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    /// A black pixel with at most this many black neighbours turns white.
    pub isolation_threshold: u32,
    /// A white pixel with at least this many black neighbours turns black.
    pub fill_threshold: u32,
    /// Components with at most this many pixels are erased after the
    /// neighbourhood pass of the simple pipeline. 0 skips that step.
    pub min_component_area: u32,
    pub connectivity: Connectivity,
}

/// Pixel adjacency used when labelling connected components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge-sharing neighbours only.
    #[default]
    Four,
    /// Edge- and corner-sharing neighbours.
    Eight,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            isolation_threshold: 1,
            fill_threshold: 7,
            min_component_area: 0,
            connectivity: Connectivity::Four,
        }
    }
}

/// Probabilistic Hough transform parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Distance resolution in pixels.
    pub rho: f64,
    /// Angle resolution in radians.
    pub theta: f64,
    /// Minimum accumulator votes for a line.
    pub threshold: u32,
    /// Shortest segment reported.
    pub min_line_length: f64,
    /// Largest gap bridged within one segment.
    pub max_line_gap: u32,
}

impl HoughConfig {
    /// Parameters for skew estimation: every segment length is accepted.
    pub fn skew() -> Self {
        Self {
            min_line_length: 0.0,
            ..Self::default()
        }
    }

    /// Parameters for boundary detection: segments shorter than 10 pixels
    /// are dropped.
    pub fn boundary() -> Self {
        Self::default()
    }
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta: std::f64::consts::PI / 180.0,
            threshold: 10,
            min_line_length: 10.0,
            max_line_gap: 10,
        }
    }
}

/// Skew-estimation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewConfig {
    /// Radius of the ink-erosion structuring element (2 gives a 5x5 square).
    pub erode_radius: u8,
    /// Radius of the edge-dilation structuring element (1 gives a 3x3 square).
    pub dilate_radius: u8,
    /// Contours enclosing less than this bounding area are blanked.
    pub min_contour_area: f64,
    pub hough: HoughConfig,
}

impl Default for SkewConfig {
    fn default() -> Self {
        Self {
            erode_radius: 2,
            dilate_radius: 1,
            min_contour_area: 5000.0,
            hough: HoughConfig::skew(),
        }
    }
}

/// Boundary-detection and crop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Endpoint difference below which a segment counts as axis-aligned.
    pub axis_tolerance: f64,
    /// Span a boundary segment must exceed along its axis.
    pub min_span: f64,
    /// Pixels trimmed inwards from the detected extremes on every side.
    pub margin: f64,
    pub hough: HoughConfig,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            axis_tolerance: 5.0,
            min_span: 20.0,
            margin: 10.0,
            hough: HoughConfig::boundary(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let tonal = &self.tonal;
        if tonal.blur_kernel == 0 || tonal.blur_kernel % 2 == 0 {
            return Err(ScanPrepError::Config(format!(
                "blur_kernel must be odd and positive, got {}",
                tonal.blur_kernel
            )));
        }
        if tonal.binarize_block < 3 || tonal.binarize_block % 2 == 0 {
            return Err(ScanPrepError::Config(format!(
                "binarize_block must be odd and at least 3, got {}",
                tonal.binarize_block
            )));
        }
        if !(tonal.canny_low <= tonal.canny_high) {
            return Err(ScanPrepError::Config(format!(
                "canny_low ({}) exceeds canny_high ({})",
                tonal.canny_low, tonal.canny_high
            )));
        }

        if self.denoise.isolation_threshold > 8 || self.denoise.fill_threshold > 8 {
            return Err(ScanPrepError::Config(
                "neighbour thresholds must lie in 0..=8".into(),
            ));
        }

        for (name, hough) in [("skew", &self.skew.hough), ("crop", &self.crop.hough)] {
            if !(hough.rho > 0.0) || !(hough.theta > 0.0) {
                return Err(ScanPrepError::Config(format!(
                    "{name}.hough resolution must be positive"
                )));
            }
            if hough.threshold == 0 {
                return Err(ScanPrepError::Config(format!(
                    "{name}.hough threshold must be positive"
                )));
            }
        }

        if !self.crop.margin.is_finite() || !self.skew.min_contour_area.is_finite() {
            return Err(ScanPrepError::Config("non-finite geometry parameter".into()));
        }

        Ok(())
    }
}
