// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition boundary — runs the simple preprocess on uploaded bytes and hands
// the result to a text recognizer.

use image::GrayImage;
use scanprep_core::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::raster;
use crate::scan::pipeline::ScanPreprocessor;

/// Anything that can turn a normalized page into text.
pub trait TextRecognizer {
    fn recognize(&self, page: &GrayImage) -> Result<String>;
}

impl<F> TextRecognizer for F
where
    F: Fn(&GrayImage) -> Result<String>,
{
    fn recognize(&self, page: &GrayImage) -> Result<String> {
        self(page)
    }
}

/// Text extracted from one uploaded file. `text` is empty when recognition
/// failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub file_name: String,
    pub text: String,
}

/// Decode `data`, preprocess it and recognize its text.
///
/// Decode, geometry and encode errors propagate. A failing recognizer does
/// not: it is logged and yields an empty `text`.
#[instrument(skip(data, recognizer, preprocessor), fields(data_len = data.len()))]
pub fn extract_text(
    file_name: &str,
    data: &[u8],
    recognizer: &dyn TextRecognizer,
    preprocessor: &ScanPreprocessor,
) -> Result<RecognitionResult> {
    let image = raster::decode(data)?;
    let page = preprocessor.preprocess(&image)?;

    let text = match recognizer.recognize(&page) {
        Ok(text) => {
            info!(chars = text.len(), "Text recognized");
            text
        }
        Err(err) => {
            error!(%err, "Recognizer failed; returning empty text");
            String::new()
        }
    };

    Ok(RecognitionResult {
        file_name: file_name.to_owned(),
        text,
    })
}
