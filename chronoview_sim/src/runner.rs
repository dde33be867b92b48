//! Playback runner - plays a synthetic recording forward, then seeks at
//! random, checking that every frame source behaves like a video.
//!
//! Checked on every returned frame:
//! - dims: the frame's `(width, height)` equals `get_dims()`
//! - shape: every frame has the shape of the first one
//! - colour format: the frame's format equals `get_colorfmt()`
//! - idempotence: re-querying an earlier time after seeking elsewhere
//!   returns an identical frame

use crate::config::PlaybackConfig;
use crate::error::SimError;
use crate::oracle::Oracle;
use crate::scenarios::ScenarioId;
use chronoview_core::{ColorFormat, FrameSource, FrameSynth, RasterFrame};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// Upper bound on frames kept for idempotence checks
const MAX_REFERENCE_FRAMES: u64 = 32;

/// Receives every frame of forward playback.
pub trait FrameObserver {
    fn observe(&mut self, tick: u64, time: f64, frame: &RasterFrame) -> Result<(), SimError>;

    /// Called once after the run with its result.
    fn finish(&mut self, _result: &ScenarioResult) -> Result<(), SimError> {
        Ok(())
    }
}

impl FrameObserver for () {
    fn observe(&mut self, _tick: u64, _time: f64, _frame: &RasterFrame) -> Result<(), SimError> {
        Ok(())
    }
}

impl<T: FrameObserver> FrameObserver for Option<T> {
    fn observe(&mut self, tick: u64, time: f64, frame: &RasterFrame) -> Result<(), SimError> {
        match self {
            Some(inner) => inner.observe(tick, time, frame),
            None => Ok(()),
        }
    }

    fn finish(&mut self, result: &ScenarioResult) -> Result<(), SimError> {
        match self {
            Some(inner) => inner.finish(result),
            None => Ok(()),
        }
    }
}

impl<A: FrameObserver, B: FrameObserver> FrameObserver for (A, B) {
    fn observe(&mut self, tick: u64, time: f64, frame: &RasterFrame) -> Result<(), SimError> {
        self.0.observe(tick, time, frame)?;
        self.1.observe(tick, time, frame)
    }

    fn finish(&mut self, result: &ScenarioResult) -> Result<(), SimError> {
        self.0.finish(result)?;
        self.1.finish(result)
    }
}

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether every frame satisfied every check
    pub passed: bool,

    /// Forward playback ticks executed
    pub total_ticks: u64,

    /// Playback time of the last forward tick
    pub final_time_secs: f64,

    /// `get_dims()` of the source
    pub dims: (usize, usize),

    /// `get_colorfmt()` of the source
    pub colorfmt: ColorFormat,

    /// First violation, if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMetrics {
    /// Frames requested, forward and seeking
    pub frames_rendered: u64,

    /// Random seeks performed
    pub seeks: u64,

    /// Repeat queries compared against a reference frame
    pub repeat_checks: u64,

    /// Frames with every byte equal (empty canvases, placeholders)
    pub uniform_frames: u64,

    /// Check failures
    pub violations: u64,
}

/// Accumulates check outcomes for one run.
struct InvariantChecker {
    dims: (usize, usize),
    colorfmt: ColorFormat,
    shape: Option<Vec<usize>>,
    metrics: ScenarioMetrics,
    first_failure: Option<String>,
}

impl InvariantChecker {
    fn new(dims: (usize, usize), colorfmt: ColorFormat) -> Self {
        Self {
            dims,
            colorfmt,
            shape: None,
            metrics: ScenarioMetrics::default(),
            first_failure: None,
        }
    }

    fn fail(&mut self, reason: String) {
        self.metrics.violations += 1;
        if self.first_failure.is_none() {
            warn!("{}", reason);
            self.first_failure = Some(reason);
        }
    }

    fn check(&mut self, source: &FrameSource, time: f64, frame: &RasterFrame) {
        self.metrics.frames_rendered += 1;
        if frame.as_bytes().first().map_or(true, |&v| frame.is_uniform(v)) {
            self.metrics.uniform_frames += 1;
        }

        if source.get_dims() != self.dims {
            self.fail(format!("t={:.4}: get_dims changed to {:?}", time, source.get_dims()));
        }
        if frame.dims() != self.dims {
            self.fail(format!("t={:.4}: frame dims {:?}, expected {:?}", time, frame.dims(), self.dims));
        }
        if frame.format() != self.colorfmt || source.get_colorfmt() != self.colorfmt {
            self.fail(format!("t={:.4}: colour format {}, expected {}", time, frame.format(), self.colorfmt));
        }
        match &self.shape {
            Some(shape) if *shape != frame.shape() => {
                let reason = format!("t={:.4}: frame shape {:?}, expected {:?}", time, frame.shape(), shape);
                self.fail(reason);
            }
            Some(_) => {}
            None => self.shape = Some(frame.shape()),
        }
    }

    fn check_repeat(&mut self, time: f64, expected: &RasterFrame, actual: &RasterFrame) {
        self.metrics.repeat_checks += 1;
        if expected != actual {
            self.fail(format!("t={:.4}: repeated query returned a different frame", time));
        }
    }
}

/// Plays scenarios back against a frame source.
pub struct PlaybackRunner {
    /// Configuration seed
    seed: u64,

    /// Recording length in seconds
    duration_secs: f64,

    config: PlaybackConfig,
}

impl PlaybackRunner {
    /// Creates a new runner with the default config and a 10 s recording.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            duration_secs: 10.0,
            config: PlaybackConfig::default(),
        }
    }

    /// Sets the recording length.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Runs a scenario.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        self.run_with(scenario, &mut ())
    }

    /// Runs a scenario, handing every forward frame to `observer`.
    pub fn run_with<O: FrameObserver>(
        &self,
        scenario: ScenarioId,
        observer: &mut O,
    ) -> Result<ScenarioResult, SimError> {
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(SimError::config(format!("duration must be positive, got {}", self.duration_secs)));
        }
        self.config.validate()?;

        info!("Running scenario: {} (seed={})", scenario, self.seed);

        // Recording and seek order come from separate streams
        let physics_seed = self.seed.wrapping_mul(0x9e3779b97f4a7c15);
        let mut oracle = Oracle::new(physics_seed);
        let data = oracle.generate(scenario, self.duration_secs, &self.config.recording)?;
        let source = FrameSource::from_data_with_config(data, self.config.render.clone());

        let options = &self.config.options;
        let window = self.config.window;
        let dims = source.get_dims();
        let colorfmt = source.get_colorfmt();
        debug!("Source {}: {}x{} {}", source.modality(), dims.0, dims.1, colorfmt);

        let mut checker = InvariantChecker::new(dims, colorfmt);

        // Forward playback
        let dt = 1.0 / self.config.tick_rate_hz;
        let total_ticks = (self.duration_secs * self.config.tick_rate_hz).floor() as u64 + 1;
        let stride = (total_ticks / MAX_REFERENCE_FRAMES).max(1);
        let mut references = Vec::new();
        let mut final_time = 0.0;

        for tick in 0..total_ticks {
            let time = tick as f64 * dt;
            let frame = source.get_frame(time, window, options);
            checker.check(&source, time, &frame);
            observer.observe(tick, time, &frame)?;

            if tick % stride == 0 {
                references.push((time, frame));
            }
            final_time = time;
        }

        // Random seeks, each followed by a repeat of an earlier query
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let low = -window - dt;
        let high = self.duration_secs + window + dt;
        for _ in 0..self.config.seeks {
            let time = rng.gen_range(low..high);
            let frame = source.get_frame(time, window, options);
            checker.check(&source, time, &frame);
            checker.metrics.seeks += 1;

            if !references.is_empty() {
                let (reference_time, expected) = &references[rng.gen_range(0..references.len())];
                let again = source.get_frame(*reference_time, window, options);
                checker.check_repeat(*reference_time, expected, &again);
            }
        }

        let passed = checker.first_failure.is_none();
        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            total_ticks,
            final_time_secs: final_time,
            dims,
            colorfmt,
            failure_reason: checker.first_failure,
            metrics: checker.metrics,
        };

        if passed {
            info!(
                "✅ {} passed: {} frames, {} seeks, {} repeat checks",
                scenario, result.metrics.frames_rendered, result.metrics.seeks, result.metrics.repeat_checks
            );
        } else {
            warn!("❌ {} failed: {} violations", scenario, result.metrics.violations);
        }

        observer.finish(&result)?;
        Ok(result)
    }
}
