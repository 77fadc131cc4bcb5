// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Optional sink for intermediate rasters.

use std::path::PathBuf;

use image::{DynamicImage, GrayImage};
use tracing::{debug, warn};

use crate::raster::{RasterFormat, encode};

/// Where intermediate rasters go, if anywhere.
///
/// Writing is best effort: failures are logged and never change what the
/// pipeline returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DebugSink {
    #[default]
    Disabled,
    /// Write PNG artifacts into this directory (created on first use).
    Directory(PathBuf),
}

impl DebugSink {
    pub fn is_enabled(&self) -> bool {
        matches!(self, DebugSink::Directory(_))
    }

    /// Store `image` under `name` (e.g. `01_grayscale.png`).
    pub fn emit(&self, name: &str, image: &GrayImage) {
        let DebugSink::Directory(dir) = self else {
            return;
        };

        let path = dir.join(name);
        let result = std::fs::create_dir_all(dir)
            .map_err(|err| err.to_string())
            .and_then(|()| {
                encode(&DynamicImage::ImageLuma8(image.clone()), RasterFormat::Png)
                    .map_err(|err| err.to_string())
            })
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(|err| err.to_string()));

        match result {
            Ok(()) => debug!(path = %path.display(), "Debug artifact written"),
            Err(err) => warn!(path = %path.display(), %err, "Failed to write debug artifact"),
        }
    }
}
