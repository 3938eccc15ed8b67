//! A complete growing vine: mesh builder, optional field binding, feature
//! spawner and stop condition, driven by [`Vine::tick`].

use crate::{
    builder::VineMeshBuilder,
    config::{FeatureConfig, VineConfig},
    error::ConfigResult,
    feature::{FeatureSpawn, FeatureSpawner},
    integrator::{FieldInstance, GrowthIntegrator},
    phases,
    random::UniformSource,
};
use glam::{Affine3A, Vec3};
use std::sync::Arc;

/// Decides when a vine stops growing, from its tip in local space.
pub trait StopCondition: Send {
    fn should_stop(&self, tip: Vec3) -> bool;
}

/// Stops once the tip rises above `height` in the vine's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopAtHeight {
    pub height: f32,
}

impl StopCondition for StopAtHeight {
    #[inline]
    fn should_stop(&self, tip: Vec3) -> bool {
        tip.y > self.height
    }
}

pub struct Vine {
    builder: VineMeshBuilder,
    integrator: Option<GrowthIntegrator>,
    spawner: FeatureSpawner,
    to_world: Affine3A,
    stop: Option<Box<dyn StopCondition>>,
    halted: bool,
}

impl Vine {
    /// Creates a vine whose tip starts at the origin of `to_world`.
    ///
    /// ### Parameters
    /// - `cfg` - Shape and growth parameters.
    /// - `features` - Feature definitions to spawn along the vine.
    /// - `to_world` - Local-to-world placement of the vine.
    /// - `field` - Field steering the growth, if any.
    /// - `rng` - Randomness for feature spawning.
    pub fn new(
        cfg: VineConfig,
        features: &[FeatureConfig],
        to_world: Affine3A,
        field: Option<Arc<FieldInstance>>,
        rng: Box<dyn UniformSource>,
    ) -> ConfigResult<Self> {
        let builder = VineMeshBuilder::new(cfg, Vec3::ZERO)?;
        let spawner = FeatureSpawner::new(features, builder.end_position(), rng)?;
        Ok(Self {
            builder,
            integrator: field.map(GrowthIntegrator::new),
            spawner,
            to_world,
            stop: None,
            halted: false,
        })
    }

    pub fn with_stop_condition(mut self, stop: impl StopCondition + 'static) -> Self {
        self.stop = Some(Box::new(stop));
        self
    }

    /// Runs one simulation step of `dt` seconds.
    ///
    /// Once the stop condition is met the vine halts for good and later
    /// ticks do nothing.
    ///
    /// ### Returns
    /// The features spawned during this step.
    pub fn tick(&mut self, dt: f32) -> Vec<FeatureSpawn> {
        if self.halted {
            return Vec::new();
        }
        if let Some(stop) = &self.stop
            && stop.should_stop(self.builder.end_position())
        {
            log::debug!("vine halted at {:?}", self.builder.end_position());
            self.halted = true;
            return Vec::new();
        }

        if let Some(integrator) = &self.integrator {
            phases::guide_phase(&mut self.builder, integrator, &self.to_world, dt);
        }
        phases::growth_phase(&mut self.builder, dt);
        phases::feature_phase(&self.builder, &mut self.spawner)
    }

    #[inline]
    pub fn is_growing(&self) -> bool {
        !self.halted
    }

    /// Stops the vine. Equivalent to its stop condition firing.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn builder(&self) -> &VineMeshBuilder {
        &self.builder
    }

    /// Mutable access for drivers that animate radius or velocity.
    pub fn builder_mut(&mut self) -> &mut VineMeshBuilder {
        &mut self.builder
    }

    pub fn to_world(&self) -> &Affine3A {
        &self.to_world
    }

    pub fn field(&self) -> Option<&Arc<FieldInstance>> {
        self.integrator.as_ref().map(GrowthIntegrator::field)
    }

    pub fn feature_spawner(&self) -> &FeatureSpawner {
        &self.spawner
    }
}
