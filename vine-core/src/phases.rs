//! Per-tick simulation phases of a single vine.
//!
//! The typical update loop looks like:
//! 1. [`guide_phase`] — the force field bends the growth velocity.
//! 2. [`growth_phase`] — the tip advances and the tube mesh is extended or
//!    reshaped.
//! 3. [`feature_phase`] — features that became due are spawned at the tip.

use crate::{
    builder::{GrowthStep, VineMeshBuilder},
    feature::{FeatureSpawn, FeatureSpawner},
    integrator::GrowthIntegrator,
};
use glam::Affine3A;

/// Integrates the field's force into the vine's velocity.
///
/// The elapsed time is scaled by the vine's own `time_scale`, matching the
/// scaling [`growth_phase`] applies to the displacement.
///
/// ### Parameters
/// - `builder` - The vine whose velocity is updated.
/// - `integrator` - Field binding of the vine.
/// - `to_world` - Local-to-world transform of the vine.
/// - `dt` - Elapsed time since the previous tick, in seconds.
pub fn guide_phase(
    builder: &mut VineMeshBuilder,
    integrator: &GrowthIntegrator,
    to_world: &Affine3A,
    dt: f32,
) {
    let state = builder.state();
    let velocity = integrator.integrate(
        to_world,
        state.end_position,
        state.velocity,
        dt,
        state.time_scale,
    );
    builder.set_velocity(velocity);
}

/// Grows the vine by `dt` seconds scaled by its `time_scale`.
///
/// ### Returns
/// Whether the step appended a control point or reshaped the last one.
pub fn growth_phase(builder: &mut VineMeshBuilder, dt: f32) -> GrowthStep {
    let time_scale = builder.state().time_scale;
    builder.grow(dt * time_scale)
}

/// Spawns every feature whose travel threshold the tip has passed.
pub fn feature_phase(builder: &VineMeshBuilder, spawner: &mut FeatureSpawner) -> Vec<FeatureSpawn> {
    spawner.update(builder.end_position(), builder.direction())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{FeatureConfig, VineConfig},
        force_field::ForceField,
        integrator::FieldInstance,
        random::FixedSource,
    };
    use glam::Vec3;
    use std::sync::Arc;

    struct PushX;

    impl ForceField for PushX {
        fn force(&self, _position: Vec3, _velocity: Vec3) -> Vec3 {
            Vec3::X
        }
    }

    fn builder(time_scale: f32) -> VineMeshBuilder {
        VineMeshBuilder::new(
            VineConfig {
                time_scale,
                ..VineConfig::default()
            },
            Vec3::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn guide_phase_scales_force_by_time_scale() {
        let mut b = builder(2.0);
        let integrator = GrowthIntegrator::new(Arc::new(FieldInstance::at_origin(PushX)));

        guide_phase(&mut b, &integrator, &Affine3A::IDENTITY, 0.25);

        // Y + X * 0.25 * 2.
        assert!((b.velocity() - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-6);
        // Guiding alone never moves the tip.
        assert_eq!(b.end_position(), Vec3::ZERO);
    }

    #[test]
    fn growth_phase_scales_displacement_by_time_scale() {
        let mut b = builder(3.0);
        assert_eq!(growth_phase(&mut b, 0.5), GrowthStep::Reshaped);
        assert!((b.end_position() - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn feature_phase_reads_tip_from_builder() {
        let mut b = builder(1.0);
        let feature = FeatureConfig {
            min_distance: 0.5,
            max_distance: 0.5,
            ..FeatureConfig::default()
        };
        let mut spawner =
            FeatureSpawner::new(&[feature], b.end_position(), Box::new(FixedSource(0.5))).unwrap();

        growth_phase(&mut b, 0.4);
        assert!(feature_phase(&b, &mut spawner).is_empty());

        growth_phase(&mut b, 0.4);
        let spawns = feature_phase(&b, &mut spawner);
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawner.trackers()[0].last_spawn_position, b.end_position());
    }
}
