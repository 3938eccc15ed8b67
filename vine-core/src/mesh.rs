//! Vertex, normal and triangle buffers of a vine tube.
//!
//! The mesh is a sequence of rings with a fixed number of vertices each.
//! Ring `i` occupies vertex slots `i * loop_resolution ..
//! (i + 1) * loop_resolution`, and consecutive rings are joined by a closed
//! band of `2 * loop_resolution` triangles.

use crate::types::Triangle;
use glam::Vec3;
use std::f32::consts::TAU;

/// Skew vector crossed with a ring's direction to find its in-plane axes.
///
/// Not parallel to any axis, so axis-aligned growth never degenerates.
const SKEW: Vec3 = Vec3::new(1.0, 2.0, 3.0);

/// Returns a unit vector perpendicular to `direction`.
pub fn ring_right(direction: Vec3) -> Vec3 {
    direction
        .cross(SKEW)
        .try_normalize()
        .unwrap_or_else(|| direction.any_orthonormal_vector())
}

/// Returns the `(right, back)` orthonormal axes spanning the plane
/// perpendicular to a unit `direction`.
pub fn ring_axes(direction: Vec3) -> (Vec3, Vec3) {
    let right = ring_right(direction);
    let back = right.cross(direction).normalize_or_zero();
    (right, back)
}

/// Writes one ring of vertices into `out`.
///
/// Vertex `i` sits at `position + radius * (back * cos(θ) + right * sin(θ))`
/// with `θ = i * 2π / out.len()`.
///
/// ### Parameters
/// - `position` - Center of the ring.
/// - `direction` - Unit direction the ring faces.
/// - `radius` - Ring radius.
/// - `out` - Destination slice; its length is the loop resolution.
pub fn sample_ring(position: Vec3, direction: Vec3, radius: f32, out: &mut [Vec3]) {
    let (right, back) = ring_axes(direction);
    let delta = TAU / out.len() as f32;
    for (i, v) in out.iter_mut().enumerate() {
        let (sin, cos) = (i as f32 * delta).sin_cos();
        *v = position + (back * cos + right * sin) * radius;
    }
}

/// Renderer-facing mesh data of one vine.
///
/// Invariants:
/// - `vertices.len()` and `normals.len()` are multiples of `loop_resolution`.
/// - Every triangle index is below `vertices.len()`.
#[derive(Debug, Clone)]
pub struct MeshBuffers {
    loop_resolution: usize,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

impl MeshBuffers {
    pub fn new(loop_resolution: usize) -> Self {
        debug_assert!(loop_resolution >= 3);
        Self {
            loop_resolution,
            vertices: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
        }
    }

    #[inline]
    pub fn loop_resolution(&self) -> usize {
        self.loop_resolution
    }

    #[inline]
    pub fn ring_count(&self) -> usize {
        self.vertices.len() / self.loop_resolution
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns the vertices of ring `index`.
    ///
    /// ### Panics
    /// Panics if `index >= ring_count()`.
    pub fn ring(&self, index: usize) -> &[Vec3] {
        let n = self.loop_resolution;
        &self.vertices[index * n..(index + 1) * n]
    }

    /// Appends a ring and, when a previous ring exists, the band joining them.
    ///
    /// ### Returns
    /// The index of the new ring.
    pub fn push_ring(&mut self, position: Vec3, direction: Vec3, radius: f32) -> usize {
        let index = self.ring_count();
        let n = self.loop_resolution;
        self.vertices.resize(self.vertices.len() + n, Vec3::ZERO);
        self.normals.resize(self.vertices.len(), Vec3::ZERO);
        sample_ring(position, direction, radius, &mut self.vertices[index * n..]);

        if index > 0 {
            self.connect_rings(index - 1, index);
        }
        index
    }

    /// Resamples ring `index` in place. Topology is untouched.
    pub fn set_ring(&mut self, index: usize, position: Vec3, direction: Vec3, radius: f32) {
        let n = self.loop_resolution;
        sample_ring(
            position,
            direction,
            radius,
            &mut self.vertices[index * n..(index + 1) * n],
        );
    }

    /// Emits the closed band of triangles between two rings.
    ///
    /// The quad at edge `i` covers `prev[i], prev[i+1], cur[i], cur[i+1]`
    /// (indices modulo the loop resolution) and is split into two
    /// counter-clockwise triangles whose normals face away from the axis.
    fn connect_rings(&mut self, prev: usize, cur: usize) {
        let n = self.loop_resolution;
        let prev_start = (prev * n) as u32;
        let cur_start = (cur * n) as u32;
        self.triangles.reserve(2 * n);

        for i in 0..n {
            let next = (i + 1) % n;
            let a1 = prev_start + i as u32;
            let b1 = prev_start + next as u32;
            let a2 = cur_start + i as u32;
            let b2 = cur_start + next as u32;

            self.triangles.push([a1, b1, a2]);
            self.triangles.push([b1, b2, a2]);
        }
    }

    /// Recomputes smooth vertex normals from the current vertex positions.
    ///
    /// Each vertex normal is the normalized sum of the (area-weighted) face
    /// normals of the triangles touching it. Vertices with no usable faces,
    /// such as those of a zero-length opening, get a zero normal.
    pub fn recalculate_normals(&mut self) {
        for n in &mut self.normals {
            *n = Vec3::ZERO;
        }

        for &[a, b, c] in &self.triangles {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let (pa, pb, pc) = (self.vertices[a], self.vertices[b], self.vertices[c]);
            let face = (pb - pa).cross(pc - pa);
            self.normals[a] += face;
            self.normals[b] += face;
            self.normals[c] += face;
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }
}
