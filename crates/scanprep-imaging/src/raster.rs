// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster I/O adapter — decode encoded image bytes into an in-memory raster and
// encode rasters back to PNG or JPEG.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat};
use scanprep_core::error::{Result, ScanPrepError};
use tracing::{debug, instrument};

/// Output encoding for a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    /// Baseline JPEG with the given quality (1-100).
    Jpeg { quality: u8 },
}

impl RasterFormat {
    /// Pick a format from a file extension, defaulting to PNG.
    pub fn from_extension(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => RasterFormat::Jpeg { quality: 90 },
            _ => RasterFormat::Png,
        }
    }
}

/// Reject rasters with a zero dimension.
pub fn ensure_geometry(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanPrepError::InvalidGeometry { width, height });
    }
    Ok(())
}

/// Decode raw encoded bytes (JPEG, PNG, TIFF, ...) into a raster.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    if data.is_empty() {
        return Err(ScanPrepError::Decode("input is empty".into()));
    }
    let image = image::load_from_memory(data)
        .map_err(|err| ScanPrepError::Decode(err.to_string()))?;
    ensure_geometry(image.width(), image.height())?;
    debug!(
        width = image.width(),
        height = image.height(),
        "Raster decoded from bytes"
    );
    Ok(image)
}

/// Read and decode a raster from disk.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let data = std::fs::read(path.as_ref())?;
    decode(&data)
}

/// Encode a raster into the requested format.
pub fn encode(image: &DynamicImage, format: RasterFormat) -> Result<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ScanPrepError::Encode(format!(
            "cannot encode an empty {}x{} raster",
            image.width(),
            image.height()
        )));
    }

    let mut buffer = Vec::new();
    match format {
        RasterFormat::Png => {
            let mut cursor = std::io::Cursor::new(&mut buffer);
            image
                .write_to(&mut cursor, ImageFormat::Png)
                .map_err(|err| ScanPrepError::Encode(format!("PNG encoding failed: {err}")))?;
        }
        RasterFormat::Jpeg { quality } => {
            // JPEG carries no alpha; flatten colour rasters to RGB.
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            let flattened = match image {
                DynamicImage::ImageLuma8(_) => image.clone(),
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            };
            flattened
                .write_with_encoder(encoder)
                .map_err(|err| ScanPrepError::Encode(format!("JPEG encoding failed: {err}")))?;
        }
    }

    debug!(bytes = buffer.len(), ?format, "Raster encoded");
    Ok(buffer)
}

/// Encode a single-channel raster.
pub fn encode_gray(image: &GrayImage, format: RasterFormat) -> Result<Vec<u8>> {
    encode(&DynamicImage::ImageLuma8(image.clone()), format)
}

/// Encode and write a raster to `path`, choosing the format from its extension.
pub fn save(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
    let bytes = encode(image, RasterFormat::from_extension(path.as_ref()))?;
    std::fs::write(path.as_ref(), bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn decode_empty_input_is_decode_error() {
        assert!(matches!(decode(&[]), Err(ScanPrepError::Decode(_))));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(ScanPrepError::Decode(_))
        ));
    }

    #[test]
    fn encode_empty_raster_is_encode_error() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            encode(&empty, RasterFormat::Png),
            Err(ScanPrepError::Encode(_))
        ));
    }

    /// PNG is lossless, so a decoded raster matches the encoded one exactly.
    #[test]
    fn png_preserves_pixels() {
        let mut gray = GrayImage::from_pixel(16, 8, Luma([200u8]));
        gray.put_pixel(3, 4, Luma([0u8]));
        let bytes = encode_gray(&gray, RasterFormat::Png).expect("encode");
        let decoded = decode(&bytes).expect("decode").to_luma8();
        assert_eq!(decoded, gray);
    }

    #[test]
    fn jpeg_keeps_dimensions() {
        let rgb = RgbImage::from_pixel(33, 17, Rgb([10, 120, 240]));
        let bytes = encode(&DynamicImage::ImageRgb8(rgb), RasterFormat::Jpeg { quality: 80 })
            .expect("encode");
        let decoded = decode(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (33, 17));
    }

    #[test]
    fn geometry_guard() {
        assert!(ensure_geometry(1, 1).is_ok());
        assert!(matches!(
            ensure_geometry(0, 5),
            Err(ScanPrepError::InvalidGeometry { width: 0, height: 5 })
        ));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(RasterFormat::from_extension("out.JPG"), RasterFormat::Jpeg { quality: 90 });
        assert_eq!(RasterFormat::from_extension("out.png"), RasterFormat::Png);
        assert_eq!(RasterFormat::from_extension("out"), RasterFormat::Png);
    }
}
