//! Core 3-D vine growth and tube meshing library.
//!
//! Main components:
//! - [`builder`] — growth state, control points and incremental tube meshing.
//! - [`mesh`] — ring sampling, triangle bands and normals.
//! - [`force_field`] — force fields that steer growth.
//! - [`integrator`] — placement of fields and force integration across frames.
//! - [`feature`] — spawning of decorative features along the vine.
//! - [`phases`] — per-tick simulation phases.
//! - [`vine`] — a complete vine driven by `tick`, with stop conditions.
//! - [`launcher`] — factory for vines with randomized parameters.
//! - [`config`] — tuning parameters and their validation.
//! - [`random`] — injected uniform randomness.
//! - [`error`] — configuration errors.
//! - [`types`] — shared type aliases and IDs.

pub mod builder;
pub mod config;
pub mod error;
pub mod feature;
pub mod force_field;
pub mod integrator;
pub mod launcher;
pub mod mesh;
pub mod phases;
pub mod random;
pub mod types;
pub mod vine;
