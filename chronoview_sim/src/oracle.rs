//! Ground truth oracle for playback tests.
//!
//! The Oracle generates the synthetic recordings every scenario plays back:
//! - Event streams: a bar sweeping across the sensor, plus noise events
//! - Image frames: scrolling gradients, optionally gated by end times
//! - Trajectories: bodies on circular orbits, with position noise
//!
//! All randomness comes from one seeded RNG, so a seed fully determines the
//! recording.

use crate::config::RecordingConfig;
use crate::error::SimError;
use crate::scenarios::ScenarioId;
use chronoview_core::{
    DvsEvent, EventStream, FrameSequence, PointSample, PointTrajectory, Pose6q, PoseTrajectory,
    SourceData, SourceImage, TimeSeries, Trajectory,
};
use nalgebra::{UnitQuaternion, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;
use tracing::debug;

/// The Oracle - owns the RNG and generates recordings.
pub struct Oracle {
    /// Seed the RNG was created from
    seed: u64,

    rng: ChaCha8Rng,
}

impl Oracle {
    /// Creates a new Oracle with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns the seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates the recording a scenario plays back.
    pub fn generate(
        &mut self,
        scenario: ScenarioId,
        duration: f64,
        config: &RecordingConfig,
    ) -> Result<SourceData, SimError> {
        let data = match scenario {
            ScenarioId::Events => SourceData::Events(self.event_stream(duration, config)?),
            ScenarioId::Frames => SourceData::Frames(self.frame_sequence(duration, config, false)?),
            ScenarioId::GatedFrames => SourceData::Frames(self.frame_sequence(duration, config, true)?),
            ScenarioId::Poses => SourceData::Poses(self.pose_trajectory(duration, config, 1)?),
            ScenarioId::MultiBody => {
                SourceData::Poses(self.pose_trajectory(duration, config, config.bodies)?)
            }
            ScenarioId::Points => {
                SourceData::Points(self.point_trajectory(duration, config, config.bodies)?)
            }
        };
        Ok(data)
    }

    /// A bar sweeping left to right once over `duration`. Leading edge
    /// events are ON, trailing edge events OFF.
    pub fn event_stream(&mut self, duration: f64, config: &RecordingConfig) -> Result<EventStream, SimError> {
        let [dim_x, dim_y] = config.sensor_dims;
        let count = (duration * config.event_rate_hz).floor().max(0.0) as usize;
        let dt = 1.0 / config.event_rate_hz;

        let mut ts = Vec::with_capacity(count);
        let mut events = Vec::with_capacity(count);
        for i in 0..count {
            let t = i as f64 * dt;
            let bar_x = ((t / duration) * dim_x as f64).floor() as usize % dim_x;
            let y = self.rng.gen_range(0..dim_y) as u16;

            let leading = bar_x < 2 || self.rng.gen_bool(0.5);
            let (x, polarity) = if leading { (bar_x, true) } else { (bar_x - 2, false) };
            ts.push(t);
            events.push(DvsEvent { x: x as u16, y, polarity });

            if self.rng.gen_bool(config.noise_event_ratio) {
                ts.push(t);
                events.push(DvsEvent {
                    x: self.rng.gen_range(0..dim_x) as u16,
                    y: self.rng.gen_range(0..dim_y) as u16,
                    polarity: self.rng.gen_bool(0.5),
                });
            }
        }

        debug!("Generated {} events on a {}x{} sensor", events.len(), dim_x, dim_y);
        Ok(EventStream::new(TimeSeries::new(ts, events)?).with_dims(dim_x, dim_y))
    }

    /// Horizontal gradients scrolling one pixel per frame. With `gated`,
    /// each frame is valid for `gate_duty` of its period.
    pub fn frame_sequence(
        &mut self,
        duration: f64,
        config: &RecordingConfig,
        gated: bool,
    ) -> Result<FrameSequence, SimError> {
        let [width, height] = config.frame_dims;
        let period = 1.0 / config.frame_rate_hz;
        let count = (duration * config.frame_rate_hz).floor().max(0.0) as usize + 1;

        let mut ts = Vec::with_capacity(count);
        let mut images = Vec::with_capacity(count);
        for i in 0..count {
            let row: Vec<u8> = (0..width)
                .map(|x| (((x + i) % width) * 255 / width) as u8)
                .collect();
            let data = row.iter().copied().cycle().take(width * height).collect();
            ts.push(i as f64 * period);
            images.push(SourceImage::gray8(width, height, data)?);
        }

        let ts_end: Vec<f64> = ts.iter().map(|t| t + period * config.gate_duty).collect();
        let sequence = FrameSequence::new(TimeSeries::new(ts, images)?)?;
        debug!("Generated {} {}x{} frames{}", count, width, height, if gated { " (gated)" } else { "" });
        if gated {
            Ok(sequence.with_ts_end(ts_end)?)
        } else {
            Ok(sequence)
        }
    }

    /// Bodies on concentric circles, each spinning about its own z axis.
    pub fn pose_trajectory(
        &mut self,
        duration: f64,
        config: &RecordingConfig,
        bodies: u32,
    ) -> Result<PoseTrajectory, SimError> {
        let (ts, ids, positions, angles) = self.orbits(duration, config, bodies)?;
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3);
        let poses = positions
            .into_iter()
            .zip(angles)
            .map(|(position, angle)| {
                let spin = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 2.0 * angle);
                Pose6q::new(position, (spin * tilt).into_inner())
            })
            .collect();
        Ok(Trajectory::with_bodies(TimeSeries::new(ts, poses)?, ids)?)
    }

    /// The same orbits without orientation.
    pub fn point_trajectory(
        &mut self,
        duration: f64,
        config: &RecordingConfig,
        bodies: u32,
    ) -> Result<PointTrajectory, SimError> {
        let (ts, ids, positions, _) = self.orbits(duration, config, bodies)?;
        let points = positions.into_iter().map(PointSample).collect();
        Ok(Trajectory::with_bodies(TimeSeries::new(ts, points)?, ids)?)
    }

    /// Samples every body at each tick; returns timestamps, body ids, noisy
    /// positions and orbit angles, index-aligned.
    #[allow(clippy::type_complexity)]
    fn orbits(
        &mut self,
        duration: f64,
        config: &RecordingConfig,
        bodies: u32,
    ) -> Result<(Vec<f64>, Vec<u32>, Vec<Vector3<f64>>, Vec<f64>), SimError> {
        let noise = Normal::new(0.0, config.position_noise_std)
            .map_err(|e| SimError::config(format!("position noise: {}", e)))?;
        let count = (duration * config.sample_rate_hz).floor().max(0.0) as usize + 1;
        let capacity = count * bodies as usize;

        let mut ts = Vec::with_capacity(capacity);
        let mut ids = Vec::with_capacity(capacity);
        let mut positions = Vec::with_capacity(capacity);
        let mut angles = Vec::with_capacity(capacity);
        for k in 0..count {
            let t = k as f64 / config.sample_rate_hz;
            for body in 0..bodies {
                let radius = 1.0 + body as f64;
                let angular_rate = TAU / duration.max(f64::EPSILON) * (1.0 + 0.5 * body as f64);
                let angle = angular_rate * t + body as f64;
                let jitter = Vector3::new(
                    noise.sample(&mut self.rng),
                    noise.sample(&mut self.rng),
                    noise.sample(&mut self.rng),
                );
                ts.push(t);
                ids.push(body);
                positions.push(Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.3 * body as f64) + jitter);
                angles.push(angle);
            }
        }

        debug!("Generated {} samples for {} bodies", ts.len(), bodies);
        Ok((ts, ids, positions, angles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_recording() {
        let config = RecordingConfig::default();
        let a = Oracle::new(7).event_stream(0.5, &config).unwrap();
        let b = Oracle::new(7).event_stream(0.5, &config).unwrap();
        let c = Oracle::new(8).event_stream(0.5, &config).unwrap();

        assert_eq!(a.events, b.events);
        assert_ne!(a.events, c.events);
    }

    #[test]
    fn test_events_within_sensor() {
        let config = RecordingConfig::default();
        let stream = Oracle::new(1).event_stream(1.0, &config).unwrap();

        assert!(stream.events.len() >= 4000);
        assert_eq!((stream.dim_x, stream.dim_y), (Some(64), Some(48)));
        for e in stream.events.samples() {
            assert!((e.x as usize) < 64 && (e.y as usize) < 48);
        }
    }

    #[test]
    fn test_gated_frames_have_end_times() {
        let config = RecordingConfig::default();
        let mut oracle = Oracle::new(3);

        let plain = oracle.frame_sequence(1.0, &config, false).unwrap();
        assert_eq!(plain.frames().len(), 11);
        assert!(plain.ts_end().is_none());

        let gated = oracle.frame_sequence(1.0, &config, true).unwrap();
        let ts_end = gated.ts_end().unwrap();
        assert!((ts_end[0] - 0.06).abs() < 1e-12);
        assert_eq!(gated.frames().samples()[0].shape(), (24, 32, 1));
    }

    #[test]
    fn test_multi_body_ids() {
        let config = RecordingConfig::default();
        let trajectory = Oracle::new(5).pose_trajectory(1.0, &config, 3).unwrap();

        assert_eq!(trajectory.samples().len(), 21 * 3);
        assert_eq!(trajectory.split_by_body().len(), 3);
        assert_eq!(&trajectory.body_ids().unwrap()[..4], &[0, 1, 2, 0]);
    }

    #[test]
    fn test_generate_matches_scenario() {
        let config = RecordingConfig::default();
        let mut oracle = Oracle::new(9);
        assert!(matches!(oracle.generate(ScenarioId::Points, 1.0, &config).unwrap(), SourceData::Points(_)));
        assert!(matches!(oracle.generate(ScenarioId::GatedFrames, 1.0, &config).unwrap(), SourceData::Frames(_)));
    }
}
