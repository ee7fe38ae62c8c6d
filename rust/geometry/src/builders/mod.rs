// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh builders, one per solid kind
//!
//! Solids of revolution share [`revolved::revolve`]; prism-like solids share
//! [`prism::loft`]. Composite kinds get their operand meshes through a
//! callback so that the caller decides how operands are cached.

pub mod cut_tube;
pub mod prism;
pub mod revolved;
pub mod tessellated;


use std::f64::consts::TAU;
use std::sync::Arc;

use nalgebra::Matrix4;

use crate::csg::CsgEvaluator;
use crate::error::Result;
use crate::mesh::Mesh;
use crate::solid::SolidKind;
use crate::store::SolidKey;

/// Tessellation settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshSettings {
    /// Segments used for a full circle
    pub segments: usize,
}

impl MeshSettings {
    pub fn new(segments: usize) -> Self {
        Self {
            segments: segments.max(3),
        }
    }

    /// Segments for an arc of `angle` radians
    pub fn segments_for(&self, angle: f64) -> usize {
        if angle >= TAU - 1e-9 {
            self.segments
        } else {
            ((angle / TAU * self.segments as f64).ceil() as usize).max(2)
        }
    }
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self { segments: 16 }
    }
}

/// Build the mesh of `kind`, asking `operand_mesh` for operands of composites.
pub fn build_mesh(
    kind: &SolidKind,
    settings: &MeshSettings,
    operand_mesh: &dyn Fn(SolidKey) -> Result<Arc<Mesh>>,
) -> Result<Mesh> {
    match kind {
        SolidKind::Box { dx, dy, dz } => prism::trap_mesh(&prism::box_trap(*dx, *dy, *dz)),
        SolidKind::Tubs {
            rmin,
            rmax,
            dz,
            sphi,
            dphi,
        } => revolved::tube(*rmin, *rmax, -dz, *dz, *sphi, *dphi, settings),
        SolidKind::CutTubs {
            rmin,
            rmax,
            dz,
            sphi,
            dphi,
            low_normal,
            high_normal,
        } => cut_tube::cut_tube(
            &cut_tube::CutTubeParams {
                rmin: *rmin,
                rmax: *rmax,
                dz: *dz,
                sphi: *sphi,
                dphi: *dphi,
                low_normal: *low_normal,
                high_normal: *high_normal,
            },
            settings,
        ),
        SolidKind::Cons {
            rmin1,
            rmax1,
            rmin2,
            rmax2,
            dz,
            sphi,
            dphi,
        } => revolved::cone(
            [*rmin1, *rmax1, *rmin2, *rmax2],
            *dz,
            *sphi,
            *dphi,
            settings,
        ),
        SolidKind::Para {
            dx,
            dy,
            dz,
            alpha,
            theta,
            phi,
        } => prism::trap_mesh(&prism::para_trap(*dx, *dy, *dz, *alpha, *theta, *phi)),
        SolidKind::Trd {
            dx1,
            dx2,
            dy1,
            dy2,
            dz,
        } => prism::trap_mesh(&prism::trd_trap(*dx1, *dx2, *dy1, *dy2, *dz)),
        SolidKind::Trap(trap) => prism::trap_mesh(trap),
        SolidKind::TwistedTrap { twist, trap } => prism::twisted_trap(trap, *twist, settings),
        SolidKind::Sphere {
            rmin,
            rmax,
            sphi,
            dphi,
            stheta,
            dtheta,
        } => revolved::sphere(*rmin, *rmax, *sphi, *dphi, *stheta, *dtheta, settings),
        SolidKind::Torus {
            rmin,
            rmax,
            rtor,
            sphi,
            dphi,
        } => revolved::torus(*rmin, *rmax, *rtor, *sphi, *dphi, settings),
        SolidKind::Polycone { sphi, dphi, planes } => {
            revolved::polycone(planes, *sphi, *dphi, settings)
        }
        SolidKind::Polyhedra {
            sphi,
            dphi,
            sides,
            planes,
        } => revolved::polyhedra(planes, *sides, *sphi, *dphi),
        SolidKind::EllipticalTube { dx, dy, dz } => {
            prism::elliptical_tube(*dx, *dy, *dz, settings)
        }
        SolidKind::Paraboloid { rlo, rhi, dz } => {
            revolved::paraboloid(*rlo, *rhi, *dz, settings)
        }
        SolidKind::Hype {
            rmin,
            rmax,
            inner_stereo,
            outer_stereo,
            dz,
        } => revolved::hype(*rmin, *rmax, *inner_stereo, *outer_stereo, *dz, settings),
        SolidKind::ExtrudedSolid { polygon, sections } => prism::extruded(polygon, sections),
        SolidKind::Tessellated { vertices, facets } => tessellated::tessellated(vertices, facets),
        SolidKind::Scaled { solid, scale } => {
            let inner = operand_mesh(*solid)?;
            Ok(inner.transformed(&Matrix4::new_nonuniform_scaling(scale)))
        }
        SolidKind::Boolean {
            op,
            left,
            right,
            placement,
        } => {
            let left = operand_mesh(*left)?;
            let right = operand_mesh(*right)?;
            CsgEvaluator::new().evaluate(*op, &left, &right, placement)
        }
    }
}
