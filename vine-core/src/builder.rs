//! Incremental tube mesh builder that traces a growing vine tip.
//!
//! Each call to [`VineMeshBuilder::grow`] moves the tip along its velocity
//! and then either appends a control point (new ring and triangle band) or
//! drags the newest control point along with the tip. New topology is only
//! added when the direction turned by more than [`ADD_ANGLE_DEG`] degrees
//! or the radius changed by more than [`ADD_RADIUS_CHANGE`], which keeps
//! straight stretches cheap.
//!
//! After every step all rings are resampled so the radius tapers from
//! `min_radius` at the tip to `radius` one `growth_length` behind it.

use crate::config::VineConfig;
use crate::error::ConfigResult;
use crate::mesh::MeshBuffers;
use crate::types::{ControlPointId, Triangle};
use glam::Vec3;

/// Minimum turn, in degrees, since the last added control point before a
/// new one is added.
pub const ADD_ANGLE_DEG: f32 = 2.0;

/// Minimum tip displacement in one step for a turn to add a control point.
pub const ADD_MIN_STEP: f32 = 1e-3;

/// Relative radius change since the last added control point that forces a
/// new one.
pub const ADD_RADIUS_CHANGE: f32 = 0.1;

/// Smallest radius accepted by [`VineMeshBuilder::set_radius`].
const MIN_RADIUS_FLOOR: f32 = 1e-6;

/// Mutable growth parameters of one vine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthState {
    pub end_position: Vec3,
    pub velocity: Vec3,
    pub velocity_scale: Vec3,
    pub time_scale: f32,
    pub radius: f32,
    pub min_radius: f32,
    pub growth_length: f32,
}

/// A recorded cross-section of the tube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Unit direction the ring faces. Falls back to the previous direction
    /// when `velocity` is zero.
    pub direction: Vec3,
}

/// What a growth step did to the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStep {
    /// A control point, ring and triangle band were appended.
    Extended,
    /// The last control point was moved to the tip.
    Reshaped,
}

/// Quadratic ease-in used for the radius taper.
#[inline]
pub fn radius_ease(t: f32) -> f32 {
    t * t
}

/// Radius of a ring `distance` behind the tip.
///
/// `min_radius` at the tip, `radius` from `growth_length` onward, and
/// `min_radius + (radius - min_radius) * t²` in between with
/// `t = distance / growth_length`.
pub fn tapered_radius(distance: f32, min_radius: f32, radius: f32, growth_length: f32) -> f32 {
    let t = if growth_length > 0.0 {
        (distance / growth_length).clamp(0.0, 1.0)
    } else {
        1.0
    };
    min_radius + (radius - min_radius) * radius_ease(t)
}

#[derive(Debug, Clone)]
pub struct VineMeshBuilder {
    state: GrowthState,
    direction: Vec3,
    last_added_direction: Vec3,
    last_added_radius: f32,
    control_points: Vec<ControlPoint>,
    mesh: MeshBuffers,
}

impl VineMeshBuilder {
    /// Creates a growing vine whose tip starts at `start`.
    ///
    /// The mesh opens with two identical control points, i.e. a zero-length
    /// band, so renderers get a valid topology before the first step.
    ///
    /// ### Errors
    /// Returns the [`crate::error::ConfigError`] from [`VineConfig::validated`].
    pub fn new(cfg: VineConfig, start: Vec3) -> ConfigResult<Self> {
        let cfg = cfg.validated()?;
        let direction = cfg.velocity.try_normalize().unwrap_or(Vec3::Y);

        let mut builder = Self {
            state: GrowthState {
                end_position: start,
                velocity: cfg.velocity,
                velocity_scale: cfg.velocity_scale,
                time_scale: cfg.time_scale,
                radius: cfg.radius,
                min_radius: cfg.min_radius,
                growth_length: cfg.growth_length,
            },
            direction,
            last_added_direction: direction,
            last_added_radius: cfg.radius,
            control_points: Vec::with_capacity(64),
            mesh: MeshBuffers::new(cfg.loop_resolution),
        };

        builder.add_control_point();
        builder.add_control_point();
        builder.update_mesh();

        log::debug!(
            "vine started at {:?}, resolution {}, radius {}..{}",
            start,
            cfg.loop_resolution,
            cfg.min_radius,
            cfg.radius
        );
        Ok(builder)
    }

    /// Advances the tip by `dt` seconds of growth time.
    ///
    /// The caller is responsible for any time scaling; `dt` is used as is.
    /// A negative or non-finite `dt` is treated as zero.
    pub fn grow(&mut self, dt: f32) -> GrowthStep {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.refresh_direction();

        let delta = (self.state.velocity * dt) * self.state.velocity_scale;
        self.state.end_position += delta;

        let turned = self.direction.dot(self.last_added_direction)
            < ADD_ANGLE_DEG.to_radians().cos()
            && delta.length() > ADD_MIN_STEP;
        let resized = (self.state.radius - self.last_added_radius).abs() / self.last_added_radius
            > ADD_RADIUS_CHANGE;

        let step = if turned || resized {
            self.add_control_point();
            self.last_added_direction = self.direction;
            self.last_added_radius = self.state.radius;
            log::trace!(
                "control point {} added at {:?}",
                self.control_points.len() - 1,
                self.state.end_position
            );
            GrowthStep::Extended
        } else {
            self.update_last_control_point();
            GrowthStep::Reshaped
        };

        self.update_mesh();
        step
    }

    pub fn state(&self) -> &GrowthState {
        &self.state
    }

    #[inline]
    pub fn end_position(&self) -> Vec3 {
        self.state.end_position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    /// Unit growth direction. Keeps the last known direction while the
    /// velocity is zero.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.state.velocity.try_normalize().unwrap_or(self.direction)
    }

    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    pub fn control_point(&self, id: ControlPointId) -> Option<&ControlPoint> {
        self.control_points.get(id)
    }

    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }

    pub fn vertices(&self) -> &[Vec3] {
        self.mesh.vertices()
    }

    pub fn triangles(&self) -> &[Triangle] {
        self.mesh.triangles()
    }

    pub fn loop_resolution(&self) -> usize {
        self.mesh.loop_resolution()
    }

    /// Replaces the growth velocity. Non-finite values are ignored.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        if !velocity.is_finite() {
            log::warn!("ignoring non-finite velocity {velocity:?}");
            return;
        }
        self.state.velocity = velocity;
    }

    /// Sets the full radius, floored at a tiny positive value.
    ///
    /// `min_radius` is lowered to stay at or below the new radius.
    pub fn set_radius(&mut self, radius: f32) {
        if !radius.is_finite() {
            log::warn!("ignoring non-finite radius {radius}");
            return;
        }
        self.state.radius = radius.max(MIN_RADIUS_FLOOR);
        self.state.min_radius = self.state.min_radius.min(self.state.radius);
    }

    /// Sets the tip radius, clamped to `[0, radius]`.
    pub fn set_min_radius(&mut self, min_radius: f32) {
        if !min_radius.is_finite() {
            log::warn!("ignoring non-finite min radius {min_radius}");
            return;
        }
        self.state.min_radius = min_radius.clamp(0.0, self.state.radius);
    }

    /// Sets the per-axis displacement scale; negative components become zero.
    pub fn set_velocity_scale(&mut self, scale: Vec3) {
        if !scale.is_finite() {
            log::warn!("ignoring non-finite velocity scale {scale:?}");
            return;
        }
        self.state.velocity_scale = scale.max(Vec3::ZERO);
    }

    /// Sets the time scale; negative values become zero.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        if !time_scale.is_finite() {
            log::warn!("ignoring non-finite time scale {time_scale}");
            return;
        }
        self.state.time_scale = time_scale.max(0.0);
    }

    fn refresh_direction(&mut self) {
        if let Some(dir) = self.state.velocity.try_normalize() {
            self.direction = dir;
        }
    }

    fn tip_control_point(&self) -> ControlPoint {
        ControlPoint {
            position: self.state.end_position,
            velocity: self.state.velocity,
            direction: self.direction,
        }
    }

    fn add_control_point(&mut self) {
        let cp = self.tip_control_point();
        self.control_points.push(cp);
        self.mesh.push_ring(cp.position, cp.direction, self.state.radius);
    }

    fn update_last_control_point(&mut self) {
        let cp = self.tip_control_point();
        if let Some(last) = self.control_points.last_mut() {
            *last = cp;
        }
    }

    /// Resamples every ring at its tapered radius, walking back from the tip.
    fn update_rings(&mut self) {
        let GrowthState {
            radius,
            min_radius,
            growth_length,
            ..
        } = self.state;

        let mut distance = 0.0;
        for i in (0..self.control_points.len()).rev() {
            if let Some(next) = self.control_points.get(i + 1) {
                distance += self.control_points[i].position.distance(next.position);
            }
            let cp = self.control_points[i];
            let r = tapered_radius(distance, min_radius, radius, growth_length);
            self.mesh.set_ring(i, cp.position, cp.direction, r);
        }
    }

    fn update_mesh(&mut self) {
        self.update_rings();
        self.mesh.recalculate_normals();
    }
}
