// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-space cuts
//!
//! A half-space is stood in for by a finite slab large enough that its own
//! edges never touch the mesh being cut. Cutting subtracts the slab, so the
//! region kept lies behind the plane (opposite the normal).

use crate::csg::{box_mesh, BooleanOp, CsgEvaluator, Plane};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::transform::Placement;
use nalgebra::{Point3, Rotation3, Vector3};

/// Slab half-thickness as a multiple of the cut mesh extent
const THICKNESS_FACTOR: f64 = 3.0;
/// Slab lateral half-size as a multiple of its half-thickness
const LATERAL_FACTOR: f64 = 10.0;

/// A cut plane through `(0, 0, distance)` with outward `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfSpaceCut {
    pub normal: Vector3<f64>,
    pub distance: f64,
}

impl HalfSpaceCut {
    pub fn new(normal: Vector3<f64>, distance: f64) -> Self {
        Self { normal, distance }
    }

    pub fn plane(&self) -> Plane {
        Plane::new(Point3::new(0.0, 0.0, self.distance), self.normal)
    }
}

/// Closed slab occupying the region just in front of `plane`.
///
/// `extent` is the largest half-size of the mesh the slab will cut; the slab is
/// `2 * 3 * extent` thick and thirty times wider than the mesh laterally.
pub fn half_space_slab(plane: &Plane, extent: f64) -> Mesh {
    let d = THICKNESS_FACTOR * extent;
    let w = LATERAL_FACTOR * d;
    let slab = box_mesh(Point3::new(-w, -w, -d), Point3::new(w, w, d));

    // The slab is symmetric, so an antiparallel normal needs no rotation
    let rotation = Rotation3::rotation_between(&Vector3::z(), &plane.normal)
        .unwrap_or_else(Rotation3::identity);
    let centre = plane.point.coords + plane.normal * d;

    slab.transformed(&Placement::new(rotation.into_inner(), centre).to_matrix())
}

/// Remove everything in front of the plane `normal · (p - (0, 0, distance)) > 0`.
pub fn cut(mesh: &Mesh, normal: &Vector3<f64>, distance: f64, extent: f64) -> Result<Mesh> {
    cut_plane(mesh, &HalfSpaceCut::new(*normal, distance).plane(), extent)
}

/// [`cut`] with an arbitrary plane
pub fn cut_plane(mesh: &Mesh, plane: &Plane, extent: f64) -> Result<Mesh> {
    if extent <= 0.0 || !extent.is_finite() {
        return Err(Error::degenerate(format!("cut extent {}", extent)));
    }
    if !plane.normal.iter().all(|c| c.is_finite()) {
        return Err(Error::degenerate("cut normal is not a direction"));
    }
    let slab = half_space_slab(plane, extent);
    CsgEvaluator::new().evaluate(BooleanOp::Subtraction, mesh, &slab, &Placement::identity())
}
