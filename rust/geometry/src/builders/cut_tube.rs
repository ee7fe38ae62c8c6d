// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tube segments with oblique end faces.
//!
//! The end planes pass through `(0, 0, ∓dz)`. A tilted plane reaches past
//! `±dz` on one side of the axis, so the tube is first built long enough to
//! fill it and then trimmed by a half-space at each tilted end.

use nalgebra::Vector3;

use super::{revolved, MeshSettings};
use crate::cut;
use crate::error::{Error, Result};
use crate::mesh::Mesh;

/// Slack on the overshoot so the cut never lands on the tube's own cap
const OVERSHOOT_MARGIN: f64 = 1.05;
const DEFAULT_NORMAL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutTubeParams {
    pub rmin: f64,
    pub rmax: f64,
    pub dz: f64,
    pub sphi: f64,
    pub dphi: f64,
    pub low_normal: Vector3<f64>,
    pub high_normal: Vector3<f64>,
}

/// Unit direction of an end normal; a zero normal has none
fn direction(normal: Vector3<f64>) -> Result<Vector3<f64>> {
    normal
        .try_normalize(1e-12)
        .ok_or_else(|| Error::degenerate(format!("cut tube normal {:?} has no direction", normal)))
}

fn is_default(normal: &Vector3<f64>, axis: Vector3<f64>) -> bool {
    (normal - axis).norm() <= DEFAULT_NORMAL_TOLERANCE
}

/// How far past the nominal end a plane with `normal` can reach within `rmax`
fn overshoot(normal: &Vector3<f64>, rmax: f64) -> f64 {
    let lateral = (normal.x * normal.x + normal.y * normal.y).sqrt();
    rmax * lateral / normal.z.abs() * OVERSHOOT_MARGIN
}

pub fn cut_tube(params: &CutTubeParams, settings: &MeshSettings) -> Result<Mesh> {
    let CutTubeParams {
        rmin,
        rmax,
        dz,
        sphi,
        dphi,
        low_normal,
        high_normal,
    } = *params;
    if !(low_normal.z < 0.0) || !(high_normal.z > 0.0) {
        return Err(Error::degenerate(format!(
            "cut tube normals {:?} / {:?} do not face away from the tube",
            low_normal, high_normal
        )));
    }

    let (low_normal, high_normal) = (direction(low_normal)?, direction(high_normal)?);
    let low_default = is_default(&low_normal, -Vector3::z());
    let high_default = is_default(&high_normal, Vector3::z());
    let low_ext = if low_default { 0.0 } else { overshoot(&low_normal, rmax) };
    let high_ext = if high_default { 0.0 } else { overshoot(&high_normal, rmax) };

    let mut mesh = revolved::tube(rmin, rmax, -dz - low_ext, dz + high_ext, sphi, dphi, settings)?;
    let extent = (dz + low_ext.max(high_ext)).max(rmax);

    if !high_default {
        mesh = cut::cut(&mesh, &high_normal, dz, extent)?;
    }
    if !low_default {
        mesh = cut::cut(&mesh, &low_normal, -dz, extent)?;
    }
    Ok(mesh)
}
