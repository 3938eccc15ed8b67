//! Force fields that steer vine growth.
//!
//! A [`ForceField`] maps a position and velocity, both expressed in the
//! field's own local frame, to a force in that same frame. Fields hold no
//! mutable state, so one field can be shared by any number of vines.

use crate::config::StickFieldConfig;
use crate::error::ConfigResult;
use glam::Vec3;
use noise::{NoiseFn, Perlin};

/// A pure function from local position and velocity to local force.
///
/// Implementations must return a finite vector for any finite input,
/// including a zero velocity.
pub trait ForceField: Send + Sync {
    fn force(&self, position: Vec3, velocity: Vec3) -> Vec3;
}

/// A field that never pushes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullField;

impl ForceField for NullField {
    #[inline]
    fn force(&self, _position: Vec3, _velocity: Vec3) -> Vec3 {
        Vec3::ZERO
    }
}

/// Gain applied to the remapped noise samples.
const NOISE_GAIN: f32 = 5.0;

/// Falloff rate of the vortex with horizontal distance from the axis.
const VORTEX_FALLOFF: f32 = 5.0;

/// Composite field that wraps vines around the vertical axis through the
/// field origin, like a plant climbing a stick.
///
/// The force is the sum of:
/// - attraction of the horizontal position toward the axis, stronger higher up,
/// - a vortex around the axis that fades quickly with distance,
/// - a constant upward lift,
/// - smooth Perlin turbulence,
///
/// minus velocity-proportional friction.
#[derive(Clone)]
pub struct StickField {
    cfg: StickFieldConfig,
    perlin: Perlin,
}

impl StickField {
    pub fn new(cfg: StickFieldConfig) -> ConfigResult<Self> {
        let cfg = cfg.validated()?;
        Ok(Self {
            cfg,
            perlin: Perlin::new(cfg.seed),
        })
    }

    pub fn config(&self) -> &StickFieldConfig {
        &self.cfg
    }

    fn attraction_force(&self, position: Vec3) -> Vec3 {
        let plane = Vec3::new(position.x, 0.0, position.z);
        -self.cfg.attraction * plane * (1.0 + position.y * self.cfg.attraction_height_factor)
    }

    fn vortex_force(&self, position: Vec3) -> Vec3 {
        let plane = Vec3::new(position.x, 0.0, position.z);
        let tangent = Vec3::new(-position.z, 0.0, position.x).normalize_or_zero();
        self.cfg.vortex * tangent * (-plane.length() * VORTEX_FALLOFF).exp()
    }

    fn raise_force(&self) -> Vec3 {
        self.cfg.raise_force * Vec3::Y
    }

    fn noise_force(&self, p: Vec3) -> Vec3 {
        let n = Vec3::new(
            self.sample(p.x + p.z * 0.5, p.y),
            self.sample(0.9 * p.x, 1.2 * p.y + p.z),
            self.sample(0.8 * p.x + p.z * 0.5, 1.1 * p.y),
        );
        self.cfg.noise * n * NOISE_GAIN
    }

    /// Perlin noise remapped into `[0, 1]`.
    fn sample(&self, x: f32, y: f32) -> f32 {
        let n = self.perlin.get([x as f64, y as f64]) as f32;
        (0.5 * (n + 1.0)).clamp(0.0, 1.0)
    }
}

impl ForceField for StickField {
    fn force(&self, position: Vec3, velocity: Vec3) -> Vec3 {
        // A corrupted velocity must not poison the returned force.
        let velocity = if velocity.is_finite() {
            velocity
        } else {
            Vec3::ZERO
        };

        self.attraction_force(position)
            + self.vortex_force(position)
            + self.raise_force()
            + self.noise_force(position)
            - velocity * self.cfg.friction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(cfg: StickFieldConfig) -> StickField {
        StickField::new(cfg).unwrap()
    }

    fn zeroed() -> StickFieldConfig {
        StickFieldConfig {
            raise_force: 0.0,
            noise: 0.0,
            vortex: 0.0,
            attraction: 0.0,
            attraction_height_factor: 0.0,
            friction: 0.0,
            seed: 0,
        }
    }

    #[test]
    fn null_field_is_zero_everywhere() {
        let f = NullField;
        assert_eq!(f.force(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn raise_force_is_constant_lift() {
        let f = only(StickFieldConfig {
            raise_force: 0.4,
            ..zeroed()
        });
        assert_eq!(f.force(Vec3::new(3.0, -2.0, 1.0), Vec3::ZERO), Vec3::new(0.0, 0.4, 0.0));
    }

    #[test]
    fn attraction_pulls_toward_axis_and_grows_with_height() {
        let f = only(StickFieldConfig {
            attraction: 0.5,
            attraction_height_factor: 2.0,
            ..zeroed()
        });

        let low = f.force(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(low, Vec3::new(-1.0, 0.0, 0.0));

        // (1 + 1 * 2) = 3 times stronger one unit up.
        let high = f.force(Vec3::new(2.0, 1.0, 0.0), Vec3::ZERO);
        assert!((high - Vec3::new(-3.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn vortex_is_tangential_and_decays() {
        let f = only(StickFieldConfig {
            vortex: 1.0,
            ..zeroed()
        });

        let near = f.force(Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO);
        let far = f.force(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);

        // Perpendicular to the radius vector (x axis).
        assert!(near.x.abs() < 1e-6 && near.y.abs() < 1e-6);
        assert!((near.z - (-0.5f32).exp()).abs() < 1e-6);
        assert!(far.length() < near.length());
    }

    #[test]
    fn vortex_on_the_axis_is_finite() {
        let f = only(StickFieldConfig {
            vortex: 1.0,
            ..zeroed()
        });
        let v = f.force(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO);
        assert!(v.is_finite());
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn friction_opposes_velocity() {
        let f = only(StickFieldConfig {
            friction: 0.5,
            ..zeroed()
        });
        assert_eq!(
            f.force(Vec3::ZERO, Vec3::new(2.0, -4.0, 0.0)),
            Vec3::new(-1.0, 2.0, 0.0)
        );
    }

    #[test]
    fn noise_is_bounded_and_continuous() {
        let f = only(StickFieldConfig {
            noise: 1.0,
            ..zeroed()
        });

        let a = f.force(Vec3::new(0.3, 0.7, 0.2), Vec3::ZERO);
        let b = f.force(Vec3::new(0.3001, 0.7, 0.2), Vec3::ZERO);

        for c in a.to_array() {
            assert!((0.0..=NOISE_GAIN).contains(&c));
        }
        assert!((a - b).length() < 1e-2);
    }

    #[test]
    fn force_is_pure() {
        let f = only(StickFieldConfig::default());
        let p = Vec3::new(0.4, 1.3, -0.8);
        let v = Vec3::new(0.1, 0.9, 0.2);
        assert_eq!(f.force(p, v), f.force(p, v));
    }

    #[test]
    fn non_finite_velocity_does_not_leak() {
        let f = only(StickFieldConfig::default());
        let v = f.force(Vec3::new(0.2, 0.5, 0.1), Vec3::splat(f32::NAN));
        assert!(v.is_finite());
    }
}
