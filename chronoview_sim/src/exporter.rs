//! Frame exporter.
//!
//! Writes played-back frames as binary PGM (luminance) or PPM (rgb) files
//! next to a `manifest.json` describing the run.

use crate::error::SimError;
use crate::runner::{FrameObserver, ScenarioResult};
use chronoview_core::{ColorFormat, RasterFrame};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// One exported frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedFrame {
    pub tick: u64,
    pub time_sec: f64,
    /// File name relative to the export directory
    pub file: String,
}

/// Complete export description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    pub width: usize,
    pub height: usize,
    pub colorfmt: ColorFormat,

    /// All exported frames, in playback order
    pub frames: Vec<ExportedFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ExportManifest {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            width: 0,
            height: 0,
            colorfmt: ColorFormat::Luminance,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Writes a frame as binary PGM or PPM, depending on its format.
pub fn write_netpbm(path: impl AsRef<Path>, frame: &RasterFrame) -> Result<(), SimError> {
    let magic = match frame.format() {
        ColorFormat::Luminance => "P5",
        ColorFormat::Rgb => "P6",
    };
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "{}\n{} {}\n255\n", magic, frame.width(), frame.height())?;
    out.write_all(frame.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Exports every `stride`-th forward frame of a run.
pub struct FrameExporter {
    dir: PathBuf,
    stride: u64,
    manifest: ExportManifest,
}

impl FrameExporter {
    /// Creates the export directory if needed.
    pub fn new(dir: impl Into<PathBuf>, scenario: &str, seed: u64) -> Result<Self, SimError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            stride: 1,
            manifest: ExportManifest::new(scenario, seed),
        })
    }

    /// Exports only every `stride`-th tick (minimum 1).
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn manifest(&self) -> &ExportManifest {
        &self.manifest
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameObserver for FrameExporter {
    fn observe(&mut self, tick: u64, time: f64, frame: &RasterFrame) -> Result<(), SimError> {
        if tick % self.stride != 0 {
            return Ok(());
        }
        let extension = match frame.format() {
            ColorFormat::Luminance => "pgm",
            ColorFormat::Rgb => "ppm",
        };
        let file = format!("frame_{:06}.{}", tick, extension);
        write_netpbm(self.dir.join(&file), frame)?;
        self.manifest.frames.push(ExportedFrame {
            tick,
            time_sec: time,
            file,
        });
        Ok(())
    }

    fn finish(&mut self, result: &ScenarioResult) -> Result<(), SimError> {
        self.manifest.width = result.dims.0;
        self.manifest.height = result.dims.1;
        self.manifest.colorfmt = result.colorfmt;
        self.manifest.passed = result.passed;
        self.manifest.failure_reason = result.failure_reason.clone();

        let path = self.dir.join("manifest.json");
        self.manifest.write_to_file(&path)?;
        info!("Exported {} frames to {}", self.manifest.frames.len(), self.dir.display());
        Ok(())
    }
}
