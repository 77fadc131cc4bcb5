// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanprep — document image normalization ahead of OCR
//
// Entry point. Initialises logging, loads the pipeline configuration, and
// dispatches to the requested subcommand.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use scanprep_core::PipelineConfig;
use scanprep_imaging::raster;
use scanprep_imaging::{DebugSink, RasterFormat, ScanPreprocessor};

#[derive(Parser)]
#[command(name = "scanprep")]
#[command(about = "Normalize photographed or scanned document pages", version)]
struct Cli {
    /// Pipeline configuration (JSON); defaults apply to missing fields
    #[arg(long, global = true, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Write intermediate rasters into this directory
    #[arg(long, global = true, value_name = "DIR")]
    debug_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grayscale, blur and denoise a page for text recognition
    Preprocess {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Output file; the extension picks PNG or JPEG
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Also erase black components of at most this many pixels
        #[arg(long, value_name = "PIXELS")]
        min_component_area: Option<u32>,
    },
    /// Straighten a tilted page and crop it to its boundary
    Deskew {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Output file; the extension picks PNG or JPEG
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,
    },
    /// Preprocess a page and print the recognized text as JSON (needs the
    /// `ocr` feature)
    Ocr {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Directory holding text-detection.rten and text-recognition.rten
        #[arg(long, value_name = "DIR")]
        model_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Command::Preprocess {
        min_component_area: Some(area),
        ..
    } = &cli.command
    {
        config.denoise.min_component_area = *area;
    }
    let sink = cli.debug_dir.clone().map_or(DebugSink::Disabled, DebugSink::Directory);
    let prep = ScanPreprocessor::new(config)?.with_debug_sink(sink);

    match cli.command {
        Command::Preprocess { image, output, .. } => run_preprocess(&prep, &image, &output),
        Command::Deskew { image, output } => run_deskew(&prep, &image, &output),
        Command::Ocr { image, model_dir } => run_ocr(&prep, &image, model_dir),
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn run_preprocess(prep: &ScanPreprocessor, image: &Path, output: &Path) -> anyhow::Result<()> {
    let data = read_input(image)?;
    let bytes = prep.preprocess_bytes(&data, RasterFormat::from_extension(output))?;
    std::fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(output = %output.display(), "Preprocessed page written");
    Ok(())
}

fn run_deskew(prep: &ScanPreprocessor, image: &Path, output: &Path) -> anyhow::Result<()> {
    let page = raster::open(image)?;
    let outcome = prep.deskew(&page)?;
    raster::save(&outcome.image, output)?;

    tracing::info!(
        output = %output.display(),
        angle = outcome.angle.degrees(),
        cropped = outcome.is_cropped(),
        "Deskewed page written"
    );
    if outcome.skew_defaulted() {
        tracing::warn!("No line segments found; page was not rotated");
    }
    Ok(())
}

#[cfg(feature = "ocr")]
fn run_ocr(prep: &ScanPreprocessor, image: &Path, model_dir: Option<PathBuf>) -> anyhow::Result<()> {
    use scanprep_imaging::{OcrConfig, OcrEngine, extract_text};

    let engine = match model_dir {
        Some(dir) => OcrEngine::from_model_dir(dir)?,
        None => OcrEngine::new(&OcrConfig::default())?,
    };

    let data = read_input(image)?;
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let result = extract_text(&file_name, &data, &engine, prep)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(not(feature = "ocr"))]
fn run_ocr(_prep: &ScanPreprocessor, _image: &Path, _model_dir: Option<PathBuf>) -> anyhow::Result<()> {
    anyhow::bail!("scanprep was built without the `ocr` feature")
}
