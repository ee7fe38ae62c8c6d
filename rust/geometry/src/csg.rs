// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean mesh evaluation
//!
//! Union, subtraction and intersection of closed meshes through the csgrs BSP
//! engine. The right operand is moved into the left operand's frame first.
//! Results are returned as computed: coincident faces or zero-volume outcomes
//! are left for the caller to judge.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::transform::Placement;
use crate::triangulation::{calculate_polygon_normal, triangulate_face};
use nalgebra::{Point3, Vector3};

/// Plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3<f64>,
    /// Normal vector (normalized on construction)
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a new plane
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Calculate signed distance from point to plane
    /// Positive = in front, Negative = behind
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }
}

/// Boolean operation of a composite solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Subtraction,
    Intersection,
}

impl BooleanOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Subtraction => "subtraction",
            BooleanOp::Intersection => "intersection",
        }
    }
}

/// Create a box mesh from AABB min/max bounds
/// Returns a mesh with 12 triangles (2 per face, 6 faces)
pub fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(24, 36);

    let v0 = Point3::new(min.x, min.y, min.z);
    let v1 = Point3::new(max.x, min.y, min.z);
    let v2 = Point3::new(max.x, max.y, min.z);
    let v3 = Point3::new(min.x, max.y, min.z);
    let v4 = Point3::new(min.x, min.y, max.z);
    let v5 = Point3::new(max.x, min.y, max.z);
    let v6 = Point3::new(max.x, max.y, max.z);
    let v7 = Point3::new(min.x, max.y, max.z);

    // Counter-clockwise seen from outside
    mesh.add_quad(v0, v3, v2, v1); // -z
    mesh.add_quad(v4, v5, v6, v7); // +z
    mesh.add_quad(v0, v4, v7, v3); // -x
    mesh.add_quad(v1, v2, v6, v5); // +x
    mesh.add_quad(v0, v1, v5, v4); // -y
    mesh.add_quad(v3, v7, v6, v2); // +y

    mesh
}

/// Boolean evaluator over csgrs meshes
pub struct CsgEvaluator {
    /// Minimum face normal length; shorter faces are dropped as degenerate
    pub epsilon: f64,
}

impl CsgEvaluator {
    pub fn new() -> Self {
        Self { epsilon: 1e-10 }
    }

    /// `left op (relative · right)`
    pub fn evaluate(
        &self,
        op: BooleanOp,
        left: &Mesh,
        right: &Mesh,
        relative: &Placement,
    ) -> Result<Mesh> {
        use csgrs::traits::CSG;

        let right = if relative.is_identity(0.0) {
            right.clone()
        } else {
            right.transformed(&relative.to_matrix())
        };

        // Empty operands have an exact answer without going through the BSP
        match (op, left.is_empty(), right.is_empty()) {
            (BooleanOp::Union, _, true) | (BooleanOp::Subtraction, _, true) => {
                return Ok(left.clone())
            }
            (BooleanOp::Union, true, false) => return Ok(right),
            (_, true, _) | (BooleanOp::Intersection, _, true) => return Ok(Mesh::new()),
            _ => {}
        }

        let left_csg = self.mesh_to_csgrs(left);
        let right_csg = self.mesh_to_csgrs(&right);

        let result = match op {
            BooleanOp::Union => left_csg.union(&right_csg),
            BooleanOp::Subtraction => left_csg.difference(&right_csg),
            BooleanOp::Intersection => left_csg.intersection(&right_csg),
        };

        tracing::trace!(
            op = op.as_str(),
            left = left.triangle_count(),
            right = right.triangle_count(),
            polygons = result.polygons.len(),
            "boolean evaluated"
        );

        self.csgrs_to_mesh(&result)
    }

    /// Convert our Mesh format to csgrs Mesh format
    fn mesh_to_csgrs(&self, mesh: &Mesh) -> csgrs::mesh::Mesh<()> {
        use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};

        let mut polygons = Vec::with_capacity(mesh.triangle_count());

        for [v0, v1, v2] in mesh.triangles() {
            // Skip degenerate triangles to avoid NaN propagation
            let face_normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(self.epsilon) {
                Some(n) => n,
                None => continue,
            };

            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];

            polygons.push(Polygon::new(vertices, None));
        }

        CSGMesh::from_polygons(&polygons, None)
    }

    /// Convert csgrs Mesh format back to our Mesh format
    fn csgrs_to_mesh(&self, csg_mesh: &csgrs::mesh::Mesh<()>) -> Result<Mesh> {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            let points_3d: Vec<Point3<f64>> = vertices
                .iter()
                .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
                .collect();

            let raw_normal = Vector3::new(
                vertices[0].normal[0],
                vertices[0].normal[1],
                vertices[0].normal[2],
            );

            // Fall back to the polygon's own normal if the carried one is unusable
            let csg_normal = match raw_normal.try_normalize(self.epsilon) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => match calculate_polygon_normal(&points_3d).try_normalize(self.epsilon) {
                    Some(n) => n,
                    None => continue,
                },
            };

            let indices = if points_3d.len() == 3 {
                vec![0, 1, 2]
            } else {
                match triangulate_face(&points_3d, &csg_normal) {
                    Ok(idx) => idx,
                    Err(_) => continue,
                }
            };

            let base = mesh.vertex_count();
            let index = |offset: usize| {
                u32::try_from(base + offset).map_err(|_| Error::MeshTooLarge(base + offset))
            };
            for p in &points_3d {
                mesh.add_vertex(*p, csg_normal);
            }
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(index(tri[0])?, index(tri[1])?, index(tri[2])?);
            }
        }

        Ok(mesh)
    }
}

impl Default for CsgEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
