//! Tuning parameters for vines, features, force fields and launching.
//!
//! Every config has a `Default` holding the reference tuning and a
//! `validated` method. Values that would corrupt the mesh topology are
//! rejected with a [`ConfigError`]; finite values that are merely out of
//! range are clamped and reported through `log::warn!`.

use crate::error::{ConfigError, ConfigResult};
use glam::Vec3;

/// Growth and shape parameters of a single vine.
///
/// ### Fields
/// - `loop_resolution` - Vertices per ring. Fixed for the vine's lifetime.
/// - `radius` - Full radius reached once a ring is `growth_length` away from the tip.
/// - `min_radius` - Radius of the ring at the growth front.
/// - `growth_length` - Distance over which the radius eases from `min_radius` to `radius`.
/// - `velocity` - Initial growth velocity.
/// - `velocity_scale` - Per-axis multiplier applied to the displacement each tick.
/// - `time_scale` - Multiplier applied to elapsed time for both force integration and growth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VineConfig {
    pub loop_resolution: usize,
    pub radius: f32,
    pub min_radius: f32,
    pub growth_length: f32,
    pub velocity: Vec3,
    pub velocity_scale: Vec3,
    pub time_scale: f32,
}

impl Default for VineConfig {
    fn default() -> Self {
        Self {
            loop_resolution: 6,
            radius: 1.0,
            min_radius: 0.1,
            growth_length: 10.0,
            velocity: Vec3::Y,
            velocity_scale: Vec3::ONE,
            time_scale: 2.0,
        }
    }
}

impl VineConfig {
    pub fn validated(mut self) -> ConfigResult<Self> {
        if self.loop_resolution < 3 {
            return Err(ConfigError::LoopResolution {
                got: self.loop_resolution,
            });
        }

        finite("radius", self.radius)?;
        finite("min_radius", self.min_radius)?;
        finite("growth_length", self.growth_length)?;
        finite("time_scale", self.time_scale)?;
        finite_vec("velocity", self.velocity)?;
        finite_vec("velocity_scale", self.velocity_scale)?;

        if self.radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius { got: self.radius });
        }
        if self.growth_length <= 0.0 {
            return Err(ConfigError::NonPositiveGrowthLength {
                got: self.growth_length,
            });
        }

        self.min_radius = clamp_warn("min_radius", self.min_radius, 0.0, self.radius);
        self.time_scale = clamp_warn("time_scale", self.time_scale, 0.0, f32::MAX);

        let scale = self.velocity_scale.max(Vec3::ZERO);
        if scale != self.velocity_scale {
            log::warn!(
                "velocity_scale {:?} has negative components, clamped to {:?}",
                self.velocity_scale,
                scale
            );
            self.velocity_scale = scale;
        }

        Ok(self)
    }
}

/// One kind of decorative feature (for example a leaf) spawned along the vine.
///
/// `kind` is an opaque tag handed back in every spawn event so the consumer
/// knows what to instantiate. Distances are measured in the vine's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureConfig {
    pub kind: u32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub offset_min: f32,
    pub offset_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            kind: 0,
            min_distance: 0.01,
            max_distance: 1.0,
            offset_min: 0.01,
            offset_max: 0.1,
            scale_min: 0.4,
            scale_max: 1.5,
        }
    }
}

impl FeatureConfig {
    pub fn validated(mut self) -> ConfigResult<Self> {
        range("distance", self.min_distance, self.max_distance)?;
        range("offset", self.offset_min, self.offset_max)?;
        range("scale", self.scale_min, self.scale_max)?;

        self.min_distance = clamp_warn("min_distance", self.min_distance, 0.0, f32::MAX);
        self.max_distance = self.max_distance.max(self.min_distance);
        self.scale_min = clamp_warn("scale_min", self.scale_min, 0.0, f32::MAX);
        self.scale_max = self.scale_max.max(self.scale_min);

        Ok(self)
    }
}

/// Coefficients of [`crate::force_field::StickField`].
///
/// All coefficients live in `[0, 1]` except `attraction_height_factor`,
/// which lives in `[0, 5]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickFieldConfig {
    pub raise_force: f32,
    pub noise: f32,
    pub vortex: f32,
    pub attraction: f32,
    pub attraction_height_factor: f32,
    pub friction: f32,
    pub seed: u32,
}

impl Default for StickFieldConfig {
    fn default() -> Self {
        Self {
            raise_force: 0.5,
            noise: 0.1,
            vortex: 0.3,
            attraction: 0.2,
            attraction_height_factor: 1.0,
            friction: 0.3,
            seed: 0,
        }
    }
}

impl StickFieldConfig {
    pub fn validated(mut self) -> ConfigResult<Self> {
        finite("raise_force", self.raise_force)?;
        finite("noise", self.noise)?;
        finite("vortex", self.vortex)?;
        finite("attraction", self.attraction)?;
        finite("attraction_height_factor", self.attraction_height_factor)?;
        finite("friction", self.friction)?;

        self.raise_force = clamp_warn("raise_force", self.raise_force, 0.0, 1.0);
        self.noise = clamp_warn("noise", self.noise, 0.0, 1.0);
        self.vortex = clamp_warn("vortex", self.vortex, 0.0, 1.0);
        self.attraction = clamp_warn("attraction", self.attraction, 0.0, 1.0);
        self.attraction_height_factor = clamp_warn(
            "attraction_height_factor",
            self.attraction_height_factor,
            0.0,
            5.0,
        );
        self.friction = clamp_warn("friction", self.friction, 0.0, 1.0);

        Ok(self)
    }
}

/// Ranges the launcher samples per-vine parameters from when a force field
/// is bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaunchConfig {
    pub velocity_scale_min: Vec3,
    pub velocity_scale_max: Vec3,
    pub time_scale_min: f32,
    pub time_scale_max: f32,
    pub height_min: f32,
    pub height_max: f32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            velocity_scale_min: Vec3::splat(0.5),
            velocity_scale_max: Vec3::splat(1.2),
            time_scale_min: 1.5,
            time_scale_max: 2.5,
            height_min: 1.5,
            height_max: 4.7,
        }
    }
}

impl LaunchConfig {
    pub fn validated(mut self) -> ConfigResult<Self> {
        finite_vec("velocity_scale_min", self.velocity_scale_min)?;
        finite_vec("velocity_scale_max", self.velocity_scale_max)?;
        range("velocity_scale.x", self.velocity_scale_min.x, self.velocity_scale_max.x)?;
        range("velocity_scale.y", self.velocity_scale_min.y, self.velocity_scale_max.y)?;
        range("velocity_scale.z", self.velocity_scale_min.z, self.velocity_scale_max.z)?;
        range("time_scale", self.time_scale_min, self.time_scale_max)?;
        range("height", self.height_min, self.height_max)?;

        // Sampled values feed VineConfig, which forbids negative scales.
        self.velocity_scale_min = self.velocity_scale_min.max(Vec3::ZERO);
        self.velocity_scale_max = self.velocity_scale_max.max(Vec3::ZERO);
        self.time_scale_min = clamp_warn("time_scale_min", self.time_scale_min, 0.0, f32::MAX);
        self.time_scale_max = self.time_scale_max.max(self.time_scale_min);

        Ok(self)
    }
}

fn finite(field: &'static str, v: f32) -> ConfigResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn finite_vec(field: &'static str, v: Vec3) -> ConfigResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn range(field: &'static str, min: f32, max: f32) -> ConfigResult<()> {
    finite(field, min)?;
    finite(field, max)?;
    if min > max {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

fn clamp_warn(field: &'static str, v: f32, min: f32, max: f32) -> f32 {
    let clamped = v.clamp(min, max);
    if clamped != v {
        log::warn!("{field} = {v} is out of [{min}, {max}], clamped to {clamped}");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vine_config_is_valid() {
        let cfg = VineConfig::default().validated().unwrap();
        assert_eq!(cfg, VineConfig::default());
    }

    #[test]
    fn loop_resolution_below_three_is_rejected() {
        let cfg = VineConfig {
            loop_resolution: 2,
            ..VineConfig::default()
        };
        assert_eq!(
            cfg.validated(),
            Err(ConfigError::LoopResolution { got: 2 })
        );
    }

    #[test]
    fn non_positive_radius_and_growth_length_are_rejected() {
        let cfg = VineConfig {
            radius: 0.0,
            ..VineConfig::default()
        };
        assert!(matches!(
            cfg.validated(),
            Err(ConfigError::NonPositiveRadius { .. })
        ));

        let cfg = VineConfig {
            growth_length: -1.0,
            ..VineConfig::default()
        };
        assert!(matches!(
            cfg.validated(),
            Err(ConfigError::NonPositiveGrowthLength { .. })
        ));
    }

    #[test]
    fn min_radius_and_velocity_scale_are_clamped() {
        let cfg = VineConfig {
            radius: 1.0,
            min_radius: 2.0,
            velocity_scale: Vec3::new(-1.0, 0.5, 2.0),
            ..VineConfig::default()
        }
        .validated()
        .unwrap();

        assert_eq!(cfg.min_radius, 1.0);
        assert_eq!(cfg.velocity_scale, Vec3::new(0.0, 0.5, 2.0));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let cfg = VineConfig {
            velocity: Vec3::new(f32::NAN, 1.0, 0.0),
            ..VineConfig::default()
        };
        assert_eq!(
            cfg.validated(),
            Err(ConfigError::NonFinite { field: "velocity" })
        );

        let field = StickFieldConfig {
            noise: f32::INFINITY,
            ..StickFieldConfig::default()
        };
        assert_eq!(
            field.validated(),
            Err(ConfigError::NonFinite { field: "noise" })
        );
    }

    #[test]
    fn stick_field_coefficients_are_clamped() {
        let cfg = StickFieldConfig {
            raise_force: 3.0,
            friction: -0.5,
            attraction_height_factor: 9.0,
            ..StickFieldConfig::default()
        }
        .validated()
        .unwrap();

        assert_eq!(cfg.raise_force, 1.0);
        assert_eq!(cfg.friction, 0.0);
        assert_eq!(cfg.attraction_height_factor, 5.0);
    }

    #[test]
    fn inverted_feature_range_is_rejected() {
        let cfg = FeatureConfig {
            scale_min: 2.0,
            scale_max: 1.0,
            ..FeatureConfig::default()
        };
        assert_eq!(
            cfg.validated(),
            Err(ConfigError::InvalidRange {
                field: "scale",
                min: 2.0,
                max: 1.0
            })
        );
    }

    #[test]
    fn launch_config_defaults_are_valid() {
        let cfg = LaunchConfig::default().validated().unwrap();
        assert_eq!(cfg, LaunchConfig::default());
    }
}
