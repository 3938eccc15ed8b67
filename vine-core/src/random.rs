//! Injected randomness.
//!
//! Everything random in a vine (feature spacing, offsets, orientation
//! jitter, launch parameters) is drawn from a [`UniformSource`] handed in
//! at construction, so tests can pin every draw.

use glam::Vec3;
use rand::{Rng, RngCore};

/// A source of uniform values in `[0, 1)`.
pub trait UniformSource: Send {
    fn value(&mut self) -> f32;
}

/// Adapts any `rand` generator into a [`UniformSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: RngCore + Send> UniformSource for RngSource<R> {
    #[inline]
    fn value(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

/// Returns the same value on every draw.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub f32);

impl UniformSource for FixedSource {
    #[inline]
    fn value(&mut self) -> f32 {
        self.0
    }
}

/// Draws a value uniformly between `min` and `max`.
#[inline]
pub fn sample_range(src: &mut dyn UniformSource, min: f32, max: f32) -> f32 {
    min + (max - min) * src.value()
}

/// Draws each component independently between the matching components of
/// `min` and `max`.
pub fn sample_vec3(src: &mut dyn UniformSource, min: Vec3, max: Vec3) -> Vec3 {
    let x = sample_range(src, min.x, max.x);
    let y = sample_range(src, min.y, max.y);
    let z = sample_range(src, min.z, max.z);
    Vec3::new(x, y, z)
}
