// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanprep.

use thiserror::Error;

/// Top-level error type for all Scanprep operations.
///
/// Only the decode, encode and geometry variants can come out of the
/// normalization pipeline itself. "No lines found" and "crop box outside the
/// raster" are fallbacks, never errors.
#[derive(Debug, Error)]
pub enum ScanPrepError {
    // -- Raster I/O --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    // -- Geometry --
    #[error("invalid raster geometry: {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },

    // -- Recognition collaborator --
    #[error("text recognition failed: {0}")]
    Recognition(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanPrepError>;
