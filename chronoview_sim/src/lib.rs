//! ChronoView Playback Harness
//!
//! Generates synthetic recordings from a single seed and plays them back
//! through the frame sources the way a video player would: forward at a
//! fixed tick rate, then seeking at random.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   SourceData   ┌─────────────┐  get_frame  ┌────────────────┐
//! │  Oracle  │ ─────────────► │ FrameSource │ ──────────► │ PlaybackRunner │
//! │ (seeded) │                └─────────────┘             │  (checks)      │
//! └──────────┘                                            └───────┬────────┘
//!                                                                 │ FrameObserver
//!                                                  ┌──────────────┴──────────────┐
//!                                                  ▼                             ▼
//!                                           FrameExporter                  RerunLogger
//!                                         (PGM/PPM + manifest)       (feature "visualization")
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use chronoview_sim::{PlaybackRunner, ScenarioId};
//!
//! let result = PlaybackRunner::new(42).with_duration(5.0).run(ScenarioId::Poses)?;
//! assert!(result.passed);
//! ```

pub mod config;
pub mod error;
pub mod exporter;
mod oracle;
mod runner;
pub mod scenarios;
pub mod visualizer;

pub use config::{PlaybackConfig, RecordingConfig};
pub use error::SimError;
pub use exporter::{ExportManifest, ExportedFrame, FrameExporter};
pub use oracle::Oracle;
pub use runner::{FrameObserver, PlaybackRunner, ScenarioMetrics, ScenarioResult};
pub use scenarios::ScenarioId;
pub use visualizer::RerunLogger;
