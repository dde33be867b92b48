//! Harness configuration.
//!
//! Loaded from JSON; every field falls back to its default when missing.

use crate::error::SimError;
use chronoview_core::{FrameOptions, RenderConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape and density of the generated recordings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Event sensor size `[width, height]` (default: 64x48)
    pub sensor_dims: [usize; 2],

    /// Bar events per second (default: 4000)
    pub event_rate_hz: f64,

    /// Probability that a bar event is followed by a noise event (default: 0.1)
    pub noise_event_ratio: f64,

    /// Image frames per second (default: 10)
    pub frame_rate_hz: f64,

    /// Image size `[width, height]` (default: 32x24)
    pub frame_dims: [usize; 2],

    /// Fraction of each frame period covered by `ts_end` in gated sequences (default: 0.6)
    pub gate_duty: f64,

    /// Trajectory samples per second and body (default: 20)
    pub sample_rate_hz: f64,

    /// Bodies in multi-body scenarios (default: 3)
    pub bodies: u32,

    /// Std deviation of trajectory position noise (default: 0.01)
    pub position_noise_std: f64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            sensor_dims: [64, 48],
            event_rate_hz: 4000.0,
            noise_event_ratio: 0.1,
            frame_rate_hz: 10.0,
            frame_dims: [32, 24],
            gate_duty: 0.6,
            sample_rate_hz: 20.0,
            bodies: 3,
            position_noise_std: 0.01,
        }
    }
}

/// Everything a playback run needs besides the seed and scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Forward playback rate (default: 30 Hz)
    pub tick_rate_hz: f64,

    /// Time window passed to every `get_frame` call (default: 0.05 s)
    pub window: f64,

    /// Random seeks after forward playback (default: 64)
    pub seeks: usize,

    /// Options passed to every `get_frame` call
    pub options: FrameOptions,

    /// Canvas for pose and point scenarios
    pub render: RenderConfig,

    pub recording: RecordingConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30.0,
            window: 0.05,
            seeks: 64,
            options: FrameOptions::default(),
            render: RenderConfig::default(),
            recording: RecordingConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_window(mut self, window: f64) -> Self {
        self.window = window;
        self
    }

    pub fn with_seeks(mut self, seeks: usize) -> Self {
        self.seeks = seeks;
        self
    }

    /// Rejects values the runner cannot play back with.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(SimError::config(format!("tick_rate_hz must be positive, got {}", self.tick_rate_hz)));
        }
        if !(self.window.is_finite() && self.window >= 0.0) {
            return Err(SimError::config(format!("window must be non-negative, got {}", self.window)));
        }

        let rec = &self.recording;
        for (name, rate) in [
            ("event_rate_hz", rec.event_rate_hz),
            ("frame_rate_hz", rec.frame_rate_hz),
            ("sample_rate_hz", rec.sample_rate_hz),
        ] {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(SimError::config(format!("{} must be positive, got {}", name, rate)));
            }
        }
        if rec.sensor_dims.contains(&0) || rec.frame_dims.contains(&0) {
            return Err(SimError::config("sensor and frame dims must be non-zero"));
        }
        if rec.sensor_dims.iter().any(|&d| d > u16::MAX as usize + 1) {
            return Err(SimError::config("sensor dims exceed the event coordinate range"));
        }
        if !(0.0..=1.0).contains(&rec.noise_event_ratio) {
            return Err(SimError::config("noise_event_ratio must lie in [0, 1]"));
        }
        if !(rec.gate_duty > 0.0 && rec.gate_duty <= 1.0) {
            return Err(SimError::config("gate_duty must lie in (0, 1]"));
        }
        if !(rec.position_noise_std.is_finite() && rec.position_noise_std >= 0.0) {
            return Err(SimError::config("position_noise_std must be non-negative"));
        }
        if rec.bodies == 0 {
            return Err(SimError::config("bodies must be at least 1"));
        }
        Ok(())
    }
}
