//! Rerun visualization for playback runs.
//!
//! Visualization is optional and only available with the `visualization` feature.
//!
//! # What Gets Logged
//!
//! - Every forward frame as an image on the `playback_time` timeline
//! - Uniform-frame flags as a scalar
//! - The scenario outcome as a text log

use crate::error::SimError;
use crate::runner::{FrameObserver, ScenarioResult};
use chronoview_core::RasterFrame;
#[cfg(feature = "visualization")]
use chronoview_core::ColorFormat;
#[cfg(feature = "visualization")]
use rerun::RecordingStream;

/// Rerun logger for playback visualization.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Entity path prefix, usually the scenario name
    #[cfg_attr(not(feature = "visualization"), allow(dead_code))]
    prefix: String,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            prefix: String::new(),
            enabled: false,
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to watch playback");
                Self {
                    rec: Some(rec),
                    prefix: name.to_string(),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs one frame at `time` on the playback timeline.
    #[cfg(feature = "visualization")]
    pub fn log_frame(&self, time: f64, frame: &RasterFrame) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("playback_time", time);
            let resolution = [frame.width() as u32, frame.height() as u32];
            let image = match frame.format() {
                ColorFormat::Luminance => rerun::Image::from_l8(frame.as_bytes().to_vec(), resolution),
                ColorFormat::Rgb => rerun::Image::from_rgb24(frame.as_bytes().to_vec(), resolution),
            };
            let _ = rec.log(format!("{}/frame", self.prefix), &image);

            let uniform = frame.as_bytes().first().map_or(true, |&v| frame.is_uniform(v));
            let _ = rec.log(
                format!("{}/uniform", self.prefix),
                &rerun::Scalar::new(if uniform { 1.0 } else { 0.0 }),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_frame(&self, _time: f64, _frame: &RasterFrame) {}

    /// Logs the outcome of a run.
    #[cfg(feature = "visualization")]
    pub fn log_result(&self, result: &ScenarioResult) {
        if let Some(ref rec) = self.rec {
            let message = match &result.failure_reason {
                Some(reason) => format!("{} failed: {}", result.scenario, reason),
                None => format!("{} passed ({} frames)", result.scenario, result.metrics.frames_rendered),
            };
            let _ = rec.log(format!("{}/result", self.prefix), &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_result(&self, _result: &ScenarioResult) {}
}

impl FrameObserver for RerunLogger {
    fn observe(&mut self, _tick: u64, time: f64, frame: &RasterFrame) -> Result<(), SimError> {
        self.log_frame(time, frame);
        Ok(())
    }

    fn finish(&mut self, result: &ScenarioResult) -> Result<(), SimError> {
        self.log_result(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronoview_core::ColorFormat;

    #[test]
    fn test_disabled_logger() {
        let mut logger = RerunLogger::disabled();
        assert!(!logger.is_enabled());

        // These should be no-ops
        let frame = RasterFrame::zeros(4, 4, ColorFormat::Rgb);
        logger.log_frame(1.0, &frame);
        assert!(logger.observe(0, 0.0, &frame).is_ok());
    }
}
