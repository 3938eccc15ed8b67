//! Factory for new vines with randomized growth parameters.

use crate::{
    config::{FeatureConfig, LaunchConfig, VineConfig},
    error::ConfigResult,
    integrator::FieldInstance,
    random::{UniformSource, sample_range, sample_vec3},
    vine::{StopAtHeight, Vine},
};
use glam::{Affine3A, Vec3};
use std::sync::Arc;

/// Per-vine parameters drawn by a [`VineLauncher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchParams {
    pub velocity_scale: Vec3,
    pub time_scale: f32,
    /// Local tip height at which the vine stops growing.
    pub height: f32,
}

impl LaunchParams {
    pub fn sample(cfg: &LaunchConfig, rng: &mut dyn UniformSource) -> Self {
        Self {
            height: sample_range(rng, cfg.height_min, cfg.height_max),
            velocity_scale: sample_vec3(rng, cfg.velocity_scale_min, cfg.velocity_scale_max),
            time_scale: sample_range(rng, cfg.time_scale_min, cfg.time_scale_max),
        }
    }
}

/// Builds a vine rooted at `origin`.
///
/// With `params`, the template's velocity and time scale are overridden and
/// the vine stops at `params.height`. Without, the template is used as is
/// and the vine grows until its owner drops it.
///
/// ### Parameters
/// - `template` - Base shape and growth parameters.
/// - `features` - Feature definitions for the new vine.
/// - `origin` - World position of the vine's root.
/// - `field` - Shared field steering the vine, if any.
/// - `params` - Sampled per-vine parameters, if any.
/// - `rng` - Randomness handed to the vine's feature spawner.
pub fn build_vine(
    template: VineConfig,
    features: &[FeatureConfig],
    origin: Vec3,
    field: Option<Arc<FieldInstance>>,
    params: Option<LaunchParams>,
    rng: Box<dyn UniformSource>,
) -> ConfigResult<Vine> {
    let mut cfg = template;
    if let Some(p) = params {
        cfg.velocity_scale = p.velocity_scale;
        cfg.time_scale = p.time_scale;
    }

    let vine = Vine::new(cfg, features, Affine3A::from_translation(origin), field, rng)?;
    Ok(match params {
        Some(p) => vine.with_stop_condition(StopAtHeight { height: p.height }),
        None => vine,
    })
}

/// Spawns vines that share one field, sampling fresh parameters for each.
pub struct VineLauncher {
    launch: LaunchConfig,
    template: VineConfig,
    features: Vec<FeatureConfig>,
    field: Option<Arc<FieldInstance>>,
    rng: Box<dyn UniformSource>,
}

impl VineLauncher {
    pub fn new(
        launch: LaunchConfig,
        template: VineConfig,
        features: Vec<FeatureConfig>,
        field: Option<Arc<FieldInstance>>,
        rng: Box<dyn UniformSource>,
    ) -> ConfigResult<Self> {
        let launch = launch.validated()?;
        let template = template.validated()?;
        let features = features
            .into_iter()
            .map(FeatureConfig::validated)
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            launch,
            template,
            features,
            field,
            rng,
        })
    }

    pub fn field(&self) -> Option<&Arc<FieldInstance>> {
        self.field.as_ref()
    }

    /// Replaces the field used by vines launched from now on.
    pub fn set_field(&mut self, field: Option<Arc<FieldInstance>>) {
        self.field = field;
    }

    /// Launches a vine at `origin`.
    ///
    /// Parameters are only randomized when a field is bound; an unguided
    /// vine uses the template unchanged.
    ///
    /// ### Parameters
    /// - `origin` - World position of the new vine's root.
    /// - `vine_rng` - Randomness handed to the new vine's feature spawner.
    pub fn launch(&mut self, origin: Vec3, vine_rng: Box<dyn UniformSource>) -> ConfigResult<Vine> {
        let params = self
            .field
            .as_ref()
            .map(|_| LaunchParams::sample(&self.launch, self.rng.as_mut()));

        log::debug!("launching vine at {origin:?} with {params:?}");
        build_vine(
            self.template,
            &self.features,
            origin,
            self.field.clone(),
            params,
            vine_rng,
        )
    }
}
