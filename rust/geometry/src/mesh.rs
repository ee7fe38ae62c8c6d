// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! Positions are kept in f64: meshes feed straight back into the boolean
//! evaluator, and cut planes must land on exact coordinates.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Error, Result};

/// Triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f64>,
    /// Triangle indices (i0, i1, i2), counter-clockwise seen from outside
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        // Past u32::MAX every index saturates; check_indexable rejects such meshes
        let index = u32::try_from(self.vertex_count()).unwrap_or(u32::MAX);
        self.positions
            .extend_from_slice(&[position.x, position.y, position.z]);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
        index
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Add a flat-shaded triangle from three points, skipping zero-area ones.
    ///
    /// Returns `false` when the triangle was degenerate and dropped.
    pub fn add_facet(&mut self, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> bool {
        let normal = match (b - a).cross(&(c - a)).try_normalize(1e-12) {
            Some(n) => n,
            None => return false,
        };
        let i0 = self.add_vertex(a, normal);
        let i1 = self.add_vertex(b, normal);
        let i2 = self.add_vertex(c, normal);
        self.add_triangle(i0, i1, i2);
        true
    }

    /// Add a planar quad `a b c d` (counter-clockwise) as two triangles.
    pub fn add_quad(&mut self, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, d: Point3<f64>) {
        self.add_facet(a, b, c);
        self.add_facet(a, c, d);
    }

    /// Fail when the vertex count no longer fits the u32 index buffer
    pub fn check_indexable(&self) -> Result<()> {
        match u32::try_from(self.vertex_count()) {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::MeshTooLarge(self.vertex_count())),
        }
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `index`
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        Point3::new(
            self.positions[index * 3],
            self.positions[index * 3 + 1],
            self.positions[index * 3 + 2],
        )
    }

    /// Iterate over triangles as point triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |t| {
            [
                self.position(t[0] as usize),
                self.position(t[1] as usize),
                self.position(t[2] as usize),
            ]
        })
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.positions.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Enclosed volume by the divergence theorem.
    ///
    /// Positive for an outward-oriented closed mesh.
    pub fn volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum()
    }

    /// Apply an affine transform in place. Normals use the inverse transpose;
    /// winding is flipped when the transform mirrors.
    pub fn apply_transform(&mut self, transform: &Matrix4<f64>) {
        let linear = transform.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(linear);

        for chunk in self.positions.chunks_exact_mut(3) {
            let p = transform.transform_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
            chunk.copy_from_slice(&[p.x, p.y, p.z]);
        }
        for chunk in self.normals.chunks_exact_mut(3) {
            let n = normal_matrix * Vector3::new(chunk[0], chunk[1], chunk[2]);
            let n = n.try_normalize(1e-12).unwrap_or(n);
            chunk.copy_from_slice(&[n.x, n.y, n.z]);
        }
        if linear.determinant() < 0.0 {
            self.flip_winding();
        }
    }

    /// Transformed copy
    pub fn transformed(&self, transform: &Matrix4<f64>) -> Mesh {
        let mut mesh = self.clone();
        mesh.apply_transform(transform);
        mesh
    }

    /// Reverse triangle orientation
    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        for n in self.normals.iter_mut() {
            *n = -*n;
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tetra() -> Mesh {
        let o = Point3::new(0.0, 0.0, 0.0);
        let x = Point3::new(1.0, 0.0, 0.0);
        let y = Point3::new(0.0, 1.0, 0.0);
        let z = Point3::new(0.0, 0.0, 1.0);
        let mut mesh = Mesh::new();
        mesh.add_facet(o, y, x);
        mesh.add_facet(o, x, z);
        mesh.add_facet(o, z, y);
        mesh.add_facet(x, y, z);
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = Mesh::new();
        let idx = mesh.add_vertex(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(idx, 0);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0]);
        assert!(mesh.check_indexable().is_ok());
    }

    #[test]
    fn test_degenerate_facet_is_dropped() {
        let mut mesh = Mesh::new();
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(!mesh.add_facet(p, p, Point3::new(2.0, 2.0, 2.0)));
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_tetra_volume() {
        assert_relative_eq!(unit_tetra().volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_keeps_volume_positive() {
        let mirror = Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
        let mesh = unit_tetra().transformed(&mirror);
        assert_relative_eq!(mesh.volume(), 1.0 / 6.0, epsilon = 1e-12);
        let (min, max) = mesh.bounds();
        assert_relative_eq!(min.x, -1.0);
        assert_relative_eq!(max.x, 0.0);
    }
}
