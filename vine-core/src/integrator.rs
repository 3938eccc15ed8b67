//! Integration of a force field into a vine's growth velocity.
//!
//! The vine and the field each live in their own frame, given as a
//! local-to-world [`Affine3A`]. Positions cross frames as points and
//! velocities/forces cross as vectors, so differing scale and rotation
//! between the two are handled correctly.

use crate::force_field::ForceField;
use glam::{Affine3A, Vec3};
use std::sync::Arc;

/// A force field placed in the world.
///
/// Shared between vines as `Arc<FieldInstance>`; it is never mutated
/// after construction.
pub struct FieldInstance {
    field: Box<dyn ForceField>,
    to_world: Affine3A,
    from_world: Affine3A,
}

impl FieldInstance {
    pub fn new(field: impl ForceField + 'static, to_world: Affine3A) -> Self {
        Self {
            field: Box::new(field),
            to_world,
            from_world: to_world.inverse(),
        }
    }

    /// Places `field` with its local frame equal to the world frame.
    pub fn at_origin(field: impl ForceField + 'static) -> Self {
        Self::new(field, Affine3A::IDENTITY)
    }

    pub fn to_world(&self) -> &Affine3A {
        &self.to_world
    }

    /// Evaluates the field in its own local frame.
    #[inline]
    pub fn local_force(&self, position: Vec3, velocity: Vec3) -> Vec3 {
        self.field.force(position, velocity)
    }
}

/// Steers one vine's velocity with a shared field.
#[derive(Clone)]
pub struct GrowthIntegrator {
    field: Arc<FieldInstance>,
}

impl GrowthIntegrator {
    pub fn new(field: Arc<FieldInstance>) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &Arc<FieldInstance> {
        &self.field
    }

    /// Returns the force acting on a vine tip, expressed in the vine's frame.
    ///
    /// ### Parameters
    /// - `vine_to_world` - Local-to-world transform of the vine.
    /// - `end_position` - Tip position in the vine's frame.
    /// - `velocity` - Growth velocity in the vine's frame.
    pub fn force_on(&self, vine_to_world: &Affine3A, end_position: Vec3, velocity: Vec3) -> Vec3 {
        let from_world = &self.field.from_world;
        let local_pos = from_world.transform_point3(vine_to_world.transform_point3(end_position));
        let local_vel = from_world.transform_vector3(vine_to_world.transform_vector3(velocity));

        let force = self.field.local_force(local_pos, local_vel);

        let world_force = self.field.to_world.transform_vector3(force);
        vine_to_world.inverse().transform_vector3(world_force)
    }

    /// Returns the velocity after applying the field for `dt` seconds.
    ///
    /// `velocity + force * dt * time_scale`, with the force from
    /// [`GrowthIntegrator::force_on`]. A non-finite force leaves the
    /// velocity unchanged.
    pub fn integrate(
        &self,
        vine_to_world: &Affine3A,
        end_position: Vec3,
        velocity: Vec3,
        dt: f32,
        time_scale: f32,
    ) -> Vec3 {
        let force = self.force_on(vine_to_world, end_position, velocity);
        if !force.is_finite() {
            log::warn!("force field returned {force:?} at {end_position:?}, ignored");
            return velocity;
        }
        velocity + force * dt * time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force_field::NullField;
    use glam::Quat;

    /// Always pushes along local +x.
    struct PushX;

    impl ForceField for PushX {
        fn force(&self, _position: Vec3, _velocity: Vec3) -> Vec3 {
            Vec3::X
        }
    }

    /// Returns the queried position, to check the point transform.
    struct EchoPosition;

    impl ForceField for EchoPosition {
        fn force(&self, position: Vec3, _velocity: Vec3) -> Vec3 {
            position
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_frames_integrate_force_over_time() {
        let integrator = GrowthIntegrator::new(Arc::new(FieldInstance::at_origin(PushX)));
        let v = integrator.integrate(&Affine3A::IDENTITY, Vec3::ZERO, Vec3::Y, 0.5, 2.0);
        assert!(approx(v, Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn null_field_leaves_velocity_untouched() {
        let integrator = GrowthIntegrator::new(Arc::new(FieldInstance::at_origin(NullField)));
        let v = integrator.integrate(&Affine3A::IDENTITY, Vec3::ONE, Vec3::Y, 1.0, 1.0);
        assert_eq!(v, Vec3::Y);
    }

    #[test]
    fn rotated_field_force_is_rotated_into_vine_frame() {
        // Field rotated 90 degrees about y: its local +x is world -z.
        let field_frame = Affine3A::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let integrator = GrowthIntegrator::new(Arc::new(FieldInstance::new(PushX, field_frame)));

        let f = integrator.force_on(&Affine3A::IDENTITY, Vec3::ZERO, Vec3::ZERO);
        assert!(approx(f, Vec3::new(0.0, 0.0, -1.0)), "got {f:?}");
    }

    #[test]
    fn vine_translation_moves_points_but_not_forces() {
        let vine_frame = Affine3A::from_translation(Vec3::new(5.0, 0.0, 0.0));

        let echo = GrowthIntegrator::new(Arc::new(FieldInstance::at_origin(EchoPosition)));
        let f = echo.force_on(&vine_frame, Vec3::new(1.0, 2.0, 0.0), Vec3::ZERO);
        assert!(approx(f, Vec3::new(6.0, 2.0, 0.0)));

        let push = GrowthIntegrator::new(Arc::new(FieldInstance::at_origin(PushX)));
        let f = push.force_on(&vine_frame, Vec3::ZERO, Vec3::ZERO);
        assert!(approx(f, Vec3::X));
    }

    #[test]
    fn scaled_vine_sees_force_in_its_own_units() {
        // A vine scaled up 2x covers twice the world distance per local unit,
        // so a unit world force is half a unit locally.
        let vine_frame = Affine3A::from_scale(Vec3::splat(2.0));
        let integrator = GrowthIntegrator::new(Arc::new(FieldInstance::at_origin(PushX)));

        let f = integrator.force_on(&vine_frame, Vec3::ZERO, Vec3::ZERO);
        assert!(approx(f, Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn one_field_serves_many_vines() {
        let field = Arc::new(FieldInstance::at_origin(PushX));
        let a = GrowthIntegrator::new(field.clone());
        let b = GrowthIntegrator::new(field.clone());
        assert_eq!(Arc::strong_count(&field), 3);
        assert_eq!(
            a.force_on(&Affine3A::IDENTITY, Vec3::ZERO, Vec3::ZERO),
            b.force_on(&Affine3A::IDENTITY, Vec3::ZERO, Vec3::ZERO)
        );
    }
}
