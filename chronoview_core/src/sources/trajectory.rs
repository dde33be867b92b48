//! Shared machinery for trajectory sources (poses and points).
//!
//! Per body, the query time is bracketed and the sample resolved:
//! - exact timestamp match: the sample as-is
//! - outside the sampled range: nothing is drawn for that body
//! - in between: interpolated, or the nearest sample when interpolation is
//!   switched off
//!
//! All bodies are drawn into one canvas, normalised by a single frame
//! computed from the union of their translations.

use crate::chronoview_space::Normalization;
use crate::chronoview_time::{bracket, nearest_index, Bracket};
use crate::options::{FrameOptions, RenderConfig};
use crate::raster::{ColorFormat, RasterFrame};
use crate::series::{BodyId, Located, TimeSeries, Trajectory};
use crate::source::FrameSynth;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Channel receiving the stale-interpolation marker (red)
const WARNING_CHANNEL: usize = 0;

/// Samples that can be blended between two neighbours.
pub trait Interpolate: Sized {
    /// `fraction = 0` yields `self`, `fraction = 1` yields `other`.
    fn interpolate(&self, other: &Self, fraction: f64) -> Self;
}

/// A trajectory sample that knows how to draw itself.
pub trait TrajectorySample: Located + Interpolate + Clone {
    /// Draws one resolved sample into the canvas.
    fn draw(&self, canvas: &mut RasterFrame, normalization: &Normalization, config: &RenderConfig);
}

/// Sample resolved for one body at one query time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolved<S> {
    pub sample: Option<S>,
    /// Interpolated between samples further apart than the window
    pub stale: bool,
}

pub(crate) fn resolve<S: TrajectorySample>(
    series: &TimeSeries<S>,
    time: f64,
    window: f64,
    interpolate: bool,
) -> Resolved<S> {
    let timestamps = series.timestamps();
    let samples = series.samples();

    match bracket(timestamps, time) {
        Bracket::Exact(i) => Resolved {
            sample: Some(samples[i].clone()),
            stale: false,
        },
        Bracket::Between { pre, post, fraction } if interpolate => Resolved {
            sample: Some(samples[pre].interpolate(&samples[post], fraction)),
            stale: timestamps[post] - timestamps[pre] > window,
        },
        Bracket::Between { .. } => Resolved {
            sample: nearest_index(timestamps, time).map(|i| samples[i].clone()),
            stale: false,
        },
        Bracket::Empty | Bracket::Before | Bracket::After => Resolved {
            sample: None,
            stale: false,
        },
    }
}

#[derive(Debug, Clone)]
struct LoadedBodies<S> {
    bodies: BTreeMap<BodyId, TimeSeries<S>>,
    normalization: Normalization,
}

/// Renders every body of a trajectory into a fixed-size rgb canvas.
#[derive(Debug, Clone)]
pub struct TrajectorySource<S> {
    config: RenderConfig,
    loaded: Option<LoadedBodies<S>>,
}

impl<S: TrajectorySample> TrajectorySource<S> {
    /// A source with the default 300x300 canvas and no data.
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    pub fn with_data(trajectory: Trajectory<S>) -> Self {
        let mut source = Self::new();
        source.set_data(trajectory);
        source
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The normalisation frame derived from the current data.
    pub fn normalization(&self) -> Option<&Normalization> {
        self.loaded.as_ref().map(|loaded| &loaded.normalization)
    }

    /// Resolved sample of every body at `time`, ordered by body id.
    pub fn resolve_all(&self, time: f64, window: f64, interpolate: bool) -> Vec<(BodyId, Option<S>)> {
        match &self.loaded {
            Some(loaded) => loaded
                .bodies
                .iter()
                .map(|(&id, series)| (id, resolve(series, time, window, interpolate).sample))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl<S: TrajectorySample> Default for TrajectorySource<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TrajectorySample> FrameSynth for TrajectorySource<S> {
    type Data = Trajectory<S>;

    fn set_data(&mut self, trajectory: Trajectory<S>) {
        let normalization = Normalization::from_samples(trajectory.samples().samples());
        let bodies = trajectory.split_by_body();
        debug!(
            "Loaded {} samples over {} bodies, extent {:.3}",
            trajectory.samples().len(),
            bodies.len(),
            normalization.largest_extent
        );
        self.loaded = Some(LoadedBodies {
            bodies,
            normalization,
        });
    }

    fn render(&self, time: f64, window: f64, options: &FrameOptions) -> RasterFrame {
        let loaded = match &self.loaded {
            Some(loaded) => loaded,
            None => {
                warn!("Trajectory frame requested before data was set");
                return RasterFrame::unset();
            }
        };

        let mut canvas = RasterFrame::zeros(self.config.width, self.config.height, ColorFormat::Rgb);
        for series in loaded.bodies.values() {
            let resolved = resolve(series, time, window, options.interpolate);
            if resolved.stale {
                canvas.stamp_corner(self.config.warning_size, WARNING_CHANNEL, u8::MAX);
            }
            if let Some(sample) = resolved.sample {
                sample.draw(&mut canvas, &loaded.normalization, &self.config);
            }
        }
        canvas
    }

    fn get_dims(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    fn get_colorfmt(&self) -> ColorFormat {
        ColorFormat::Rgb
    }
}
