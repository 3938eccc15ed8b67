//! Spawning of decorative features (leaves and the like) along a vine.
//!
//! Each feature definition remembers where it last spawned and how far the
//! tip must travel before the next spawn. The spawner only emits
//! [`FeatureSpawn`] events; instantiating and animating whatever the event
//! describes is the consumer's job.

use crate::config::FeatureConfig;
use crate::error::ConfigResult;
use crate::mesh::ring_axes;
use crate::random::{UniformSource, sample_range};
use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::PI;

/// Pitch range, in degrees, a feature tilts away from the vine.
const PITCH_DEG: (f32, f32) = (30.0, 45.0);
/// Jitter, in degrees, around the heading of the sampled normal.
const YAW_JITTER_DEG: (f32, f32) = (-10.0, 10.0);
/// Roll range, in degrees.
const ROLL_DEG: (f32, f32) = (-20.0, 20.0);

/// One feature to be instantiated by the consumer.
///
/// ### Fields
/// - `feature` - Index of the definition in the spawner.
/// - `kind` - The definition's [`FeatureConfig::kind`] tag.
/// - `position` - Spawn position in the vine's local frame, offset from the tip along `normal`.
/// - `normal` - Unit vector perpendicular to the growth direction.
/// - `rotation` - Orientation of the feature in the vine's local frame.
/// - `scale` - Uniform target scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpawn {
    pub feature: usize,
    pub kind: u32,
    pub position: Vec3,
    pub normal: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

/// Per-definition spawn bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct FeatureTracker {
    pub config: FeatureConfig,
    pub last_spawn_position: Vec3,
    pub next_spawn_distance: f32,
}

impl FeatureTracker {
    fn new(config: FeatureConfig, tip: Vec3, rng: &mut dyn UniformSource) -> Self {
        Self {
            config,
            last_spawn_position: tip,
            next_spawn_distance: sample_range(rng, config.min_distance, config.max_distance),
        }
    }

    #[inline]
    fn is_due(&self, tip: Vec3) -> bool {
        self.last_spawn_position.distance(tip) > self.next_spawn_distance
    }
}

pub struct FeatureSpawner {
    trackers: Vec<FeatureTracker>,
    rng: Box<dyn UniformSource>,
}

impl FeatureSpawner {
    /// Creates a spawner for `features`, all starting at `tip`.
    ///
    /// ### Errors
    /// Fails if any definition is rejected by [`FeatureConfig::validated`].
    pub fn new(
        features: &[FeatureConfig],
        tip: Vec3,
        mut rng: Box<dyn UniformSource>,
    ) -> ConfigResult<Self> {
        let trackers = features
            .iter()
            .map(|f| -> ConfigResult<FeatureTracker> {
                Ok(FeatureTracker::new(f.validated()?, tip, rng.as_mut()))
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { trackers, rng })
    }

    /// A spawner with no features. Never emits anything.
    pub fn empty(rng: Box<dyn UniformSource>) -> Self {
        Self {
            trackers: Vec::new(),
            rng,
        }
    }

    pub fn trackers(&self) -> &[FeatureTracker] {
        &self.trackers
    }

    /// Checks every definition against the current tip and returns the
    /// spawns that became due, in definition order.
    ///
    /// ### Parameters
    /// - `tip` - Current tip position in the vine's local frame.
    /// - `direction` - Unit growth direction at the tip.
    pub fn update(&mut self, tip: Vec3, direction: Vec3) -> Vec<FeatureSpawn> {
        let mut spawns = Vec::new();
        for (index, tracker) in self.trackers.iter_mut().enumerate() {
            if !tracker.is_due(tip) {
                continue;
            }
            let spawn = spawn_feature(index, tracker, tip, direction, self.rng.as_mut());
            log::debug!(
                "feature {} (kind {}) spawned at {:?}, scale {}",
                index,
                spawn.kind,
                spawn.position,
                spawn.scale
            );
            spawns.push(spawn);
        }
        spawns
    }
}

/// Samples a unit normal on the half circle perpendicular to `direction`.
pub fn sample_normal(direction: Vec3, rng: &mut dyn UniformSource) -> Vec3 {
    let (right, back) = ring_axes(direction);
    let angle = rng.value() * PI;
    (right * angle.cos() + back * angle.sin()).normalize_or_zero()
}

/// Orientation of a feature growing out along `normal`.
///
/// The yaw follows the horizontal heading of the normal, flipped when the
/// normal points downward, with some pitch and roll jitter on top.
fn feature_rotation(normal: Vec3, rng: &mut dyn UniformSource) -> Quat {
    let flip = if normal.y < 0.0 { -1.0 } else { 1.0 };
    let heading = (flip * normal.z).atan2(flip * normal.x);

    let pitch = sample_range(rng, PITCH_DEG.0, PITCH_DEG.1).to_radians();
    let yaw = sample_range(rng, YAW_JITTER_DEG.0, YAW_JITTER_DEG.1).to_radians() + heading
        - 90f32.to_radians();
    let roll = sample_range(rng, ROLL_DEG.0, ROLL_DEG.1).to_radians();

    Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll)
}

fn spawn_feature(
    index: usize,
    tracker: &mut FeatureTracker,
    tip: Vec3,
    direction: Vec3,
    rng: &mut dyn UniformSource,
) -> FeatureSpawn {
    let cfg = tracker.config;
    let normal = sample_normal(direction, rng);
    let offset = sample_range(rng, cfg.offset_min, cfg.offset_max);
    let rotation = feature_rotation(normal, rng);
    let scale = sample_range(rng, cfg.scale_min, cfg.scale_max);

    tracker.last_spawn_position = tip;
    tracker.next_spawn_distance = sample_range(rng, cfg.min_distance, cfg.max_distance);

    FeatureSpawn {
        feature: index,
        kind: cfg.kind,
        position: tip + normal * offset,
        normal,
        rotation,
        scale,
    }
}
